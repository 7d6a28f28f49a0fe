//! External collaborators that supply raw platform data.

mod oembed;
mod ytdlp;

use async_trait::async_trait;

use crate::models::VideoReference;

pub use oembed::OEmbedProvider;
pub use ytdlp::YtDlpProvider;

pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Display metadata as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub title: String,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u64>
}

/// One stream from the provider's native format list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStream {
    /// Provider container name, e.g. `mp4` or `webm`.
    pub container: String,
    pub quality_label: Option<String>,
    pub has_audio: bool,
    pub has_video: bool,
    /// Byte length exactly as the provider reported it.
    pub content_length: Option<String>,
    pub url: Option<String>
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, reference: &VideoReference) -> Result<ProviderMetadata, ProviderError>;
}

#[async_trait]
pub trait StreamProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn streams(&self, reference: &VideoReference) -> Result<Vec<ProviderStream>, ProviderError>;
}
