use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::{MetadataProvider, ProviderError, ProviderMetadata};
use crate::models::{Platform, VideoReference};

static LENGTH_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""lengthSeconds":"(\d+)""#).expect("valid lengthSeconds pattern"));

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>
}

/// Title and author from the oEmbed endpoint; duration scraped from the
/// watch page when it can be found there.
#[derive(Debug, Clone)]
pub struct OEmbedProvider {
    client: reqwest::Client,
    endpoint: String,
    watch_base: String
}

impl OEmbedProvider {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            watch_base: "https://www.youtube.com/watch".to_string()
        }
    }

    #[cfg(test)]
    fn with_watch_base(mut self, watch_base: impl Into<String>) -> Self {
        self.watch_base = watch_base.into();
        self
    }

    async fn scrape_duration(&self, video_id: &str) -> Result<Option<u64>, ProviderError> {
        let mut page_url = Url::parse(&self.watch_base)?;
        page_url.query_pairs_mut().append_pair("v", video_id);

        let response = self.client.get(page_url).send().await?;
        if !response.status().is_success() {
            return Err(format!("watch page returned HTTP {}", response.status()).into());
        }

        let html = response.text().await?;
        Ok(parse_length_seconds(&html))
    }
}

#[async_trait]
impl MetadataProvider for OEmbedProvider {
    fn name(&self) -> &'static str {
        "oembed"
    }

    async fn fetch(&self, reference: &VideoReference) -> Result<ProviderMetadata, ProviderError> {
        if reference.platform != Platform::YouTube {
            return Err(format!("oEmbed lookup is not available for {}", reference.platform).into());
        }

        let mut oembed_url = Url::parse(&self.endpoint)?;
        oembed_url
            .query_pairs_mut()
            .append_pair("url", &reference.original_url)
            .append_pair("format", "json");

        tracing::debug!("Fetching from oEmbed: {}", oembed_url);

        let response = self.client.get(oembed_url).send().await?;
        if !response.status().is_success() {
            return Err(format!("oEmbed returned HTTP {}", response.status()).into());
        }

        let body = response.bytes().await?;
        let oembed: OEmbedResponse = serde_json::from_slice(&body)?;

        let duration_seconds = match self.scrape_duration(&reference.native_id).await {
            Ok(duration) => duration,
            Err(e) => {
                tracing::debug!("Could not read duration for {}: {}", reference.native_id, e);
                None
            }
        };

        Ok(ProviderMetadata {
            title: oembed.title,
            author: oembed.author_name,
            thumbnail_url: oembed.thumbnail_url,
            duration_seconds
        })
    }
}

fn parse_length_seconds(html: &str) -> Option<u64> {
    LENGTH_SECONDS
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
