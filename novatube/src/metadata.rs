use std::time::Duration;

use crate::error::CoreError;
use crate::models::{Platform, VideoMetadata, VideoReference, youtube_thumbnail_url};
use crate::providers::MetadataProvider;

/// One provider lookup, bounded by `timeout`. Not retried.
pub async fn fetch_metadata(
    provider: &dyn MetadataProvider,
    reference: &VideoReference,
    timeout: Duration
) -> Result<VideoMetadata, CoreError> {
    if reference.platform != Platform::YouTube {
        return Err(CoreError::PlatformNotImplemented(reference.platform));
    }

    let fetched = tokio::time::timeout(timeout, provider.fetch(reference))
        .await
        .map_err(|_| CoreError::MetadataUnavailable(format!("{} timed out after {timeout:?}", provider.name())))?
        .map_err(|e| CoreError::MetadataUnavailable(e.to_string()))?;

    if fetched.title.trim().is_empty() {
        return Err(CoreError::MetadataUnavailable(format!("{} returned no title", provider.name())));
    }

    let thumbnail_url = fetched
        .thumbnail_url
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| youtube_thumbnail_url(&reference.native_id));

    tracing::info!("Fetched metadata for {} via {}", reference.native_id, provider.name());

    Ok(VideoMetadata::new(
        reference.native_id.clone(),
        fetched.title,
        thumbnail_url,
        fetched.duration_seconds,
        fetched.author.unwrap_or_default(),
        reference.original_url.clone()
    ))
}
