//! Recognizes the source platform of a pasted URL and pulls out the
//! platform's video id.

use url::Url;

use crate::error::CoreError;
use crate::models::{Platform, VideoReference};

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com"
];

const INSTAGRAM_HOSTS: &[&str] = &["instagram.com", "www.instagram.com", "m.instagram.com"];

/// Path prefixes that carry the id as the following segment.
const YOUTUBE_ID_PATHS: &[&str] = &["embed", "v", "shorts", "live"];

const YOUTUBE_ID_LEN: usize = 11;

pub fn classify(raw: &str) -> Result<VideoReference, CoreError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| CoreError::InvalidUrl(format!("{trimmed}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CoreError::InvalidUrl(format!("{trimmed}: scheme must be http or https")));
    }

    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| CoreError::InvalidUrl(format!("{trimmed}: missing host")))?;

    if YOUTUBE_HOSTS.contains(&host.as_str()) {
        let native_id = youtube_id(&url, &host)
            .ok_or_else(|| CoreError::IdExtractionFailed(trimmed.to_string()))?;
        return Ok(VideoReference {
            platform: Platform::YouTube,
            native_id,
            original_url: trimmed.to_string()
        });
    }

    if INSTAGRAM_HOSTS.contains(&host.as_str()) {
        return Ok(VideoReference {
            platform: Platform::Instagram,
            native_id: String::new(),
            original_url: trimmed.to_string()
        });
    }

    Err(CoreError::UnsupportedPlatform(host))
}

fn youtube_id(url: &Url, host: &str) -> Option<String> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host == "youtu.be" {
        segments.first().map(|s| (*s).to_string())
    } else if segments.first() == Some(&"watch") {
        url.query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
    } else {
        match segments.as_slice() {
            [prefix, id, ..] if YOUTUBE_ID_PATHS.contains(prefix) => Some((*id).to_string()),
            _ => None
        }
    }?;

    is_youtube_id(&candidate).then_some(candidate)
}

pub fn is_youtube_id(token: &str) -> bool {
    token.len() == YOUTUBE_ID_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
