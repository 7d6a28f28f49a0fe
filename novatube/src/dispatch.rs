use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::classifier::{classify, is_youtube_id};
use crate::error::CoreError;
use crate::models::{
    Container, DownloadStatus, FormatOption, NewDownloadRecord, Platform, VideoMetadata,
    youtube_watch_url
};

/// Append-only store for download audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: &NewDownloadRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub download_url: String,
    pub file_name: String,
    pub video_id: String,
    pub format: Container,
    pub quality: String,
    /// Whether `download_url` points at the provider stream itself rather than
    /// the platform's watch page.
    pub direct_download: bool
}

/// Resolves the URL and filename for `chosen` and records the attempt.
///
/// Recording is best effort: a failed or slow audit write is logged and the
/// dispatch still succeeds. The only failure is having no usable URL.
pub async fn dispatch(
    audit: &dyn AuditSink,
    metadata: &VideoMetadata,
    chosen: &FormatOption,
    user_id: Option<&str>,
    timeout: Duration
) -> Result<DispatchResult, CoreError> {
    let file_name = derive_file_name(&metadata.title, &metadata.id, chosen.container);
    let resolved = resolve_download_url(metadata, chosen);

    let status = if resolved.is_some() {
        DownloadStatus::Completed
    } else {
        DownloadStatus::Failed
    };

    let record = NewDownloadRecord {
        user_id: user_id.map(String::from),
        video_title: metadata.title.clone(),
        video_url: metadata.source_url.clone(),
        thumbnail_url: metadata.thumbnail_url.clone(),
        container: chosen.container,
        quality_label: chosen.quality_label.clone(),
        approximate_size_bytes: chosen.approximate_size_bytes,
        size: chosen.size.clone(),
        status
    };

    match tokio::time::timeout(timeout, audit.record(&record)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Error recording download of {}: {}", metadata.title, e),
        Err(_) => tracing::warn!("Recording download of {} timed out after {:?}", metadata.title, timeout)
    }

    let Some((download_url, direct_download)) = resolved else {
        return Err(CoreError::DispatchFailed(format!(
            "no download URL available for {}",
            chosen.id
        )));
    };

    tracing::info!(
        "Dispatched {} ({} {}) direct={}",
        file_name,
        chosen.container,
        chosen.quality_label,
        direct_download
    );

    Ok(DispatchResult {
        download_url,
        file_name,
        video_id: metadata.id.clone(),
        format: chosen.container,
        quality: chosen.quality_label.clone(),
        direct_download
    })
}

/// Strips everything but word characters and whitespace from the title and
/// appends the container extension. Falls back to the video id when nothing
/// printable remains.
pub fn derive_file_name(title: &str, video_id: &str, container: Container) -> String {
    let stem: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let stem = if stem.trim().is_empty() {
        let id: String = video_id
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if id.is_empty() { "video".to_string() } else { id }
    } else {
        stem
    };

    format!("{stem}.{container}")
}

/// Provider stream URL first, then the platform watch page.
fn resolve_download_url(metadata: &VideoMetadata, chosen: &FormatOption) -> Option<(String, bool)> {
    if let Some(url) = chosen.source_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        return Some((url.to_string(), true));
    }

    let fallback = match classify(&metadata.source_url) {
        Ok(reference) if reference.platform == Platform::YouTube => Some(reference.watch_url()),
        Ok(reference) => Some(reference.original_url),
        Err(_) if is_youtube_id(&metadata.id) => Some(youtube_watch_url(&metadata.id)),
        Err(_) => None
    };

    fallback.map(|url| (url, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingAudit, RecordingAudit, SlowProvider};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn metadata(title: &str) -> VideoMetadata {
        VideoMetadata::new(
            "dQw4w9WgXcQ".to_string(),
            title.to_string(),
            "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string(),
            Some(212),
            "Rick Astley".to_string(),
            "https://youtu.be/dQw4w9WgXcQ".to_string()
        )
    }

    fn option(source_url: Option<&str>) -> FormatOption {
        FormatOption {
            id: "mp4-720p".to_string(),
            label: "MP4 - 720p".to_string(),
            container: Container::Mp4,
            quality_label: "720p".to_string(),
            approximate_size_bytes: Some(26_214_400),
            size: "25 MB".to_string(),
            source_url: source_url.map(String::from)
        }
    }

    #[test]
    fn test_derive_file_name_strips_punctuation() {
        assert_eq!(
            derive_file_name("How To: Cook! Rice?", "dQw4w9WgXcQ", Container::Mp4),
            "How To Cook Rice.mp4"
        );
        assert_eq!(
            derive_file_name("a/b\\c..d", "dQw4w9WgXcQ", Container::Webm),
            "abcd.webm"
        );
        assert_eq!(derive_file_name("snake_case 2", "x", Container::Mp3), "snake_case 2.mp3");
    }

    #[test]
    fn test_derive_file_name_keeps_non_ascii_letters() {
        assert_eq!(derive_file_name("Café!", "dQw4w9WgXcQ", Container::Mp4), "Café.mp4");
        assert_eq!(derive_file_name("東京 2024?", "dQw4w9WgXcQ", Container::Webm), "東京 2024.webm");
    }

    #[test]
    fn test_derive_file_name_falls_back_to_id() {
        assert_eq!(derive_file_name("?!?", "dQw4w9WgXcQ", Container::Mp4), "dQw4w9WgXcQ.mp4");
        assert_eq!(derive_file_name("", "", Container::Mp4), "video.mp4");
    }

    #[tokio::test]
    async fn test_dispatch_prefers_direct_url() {
        let audit = RecordingAudit::default();
        let result = dispatch(
            &audit,
            &metadata("Never Gonna Give You Up"),
            &option(Some("https://rr1.googlevideo.com/videoplayback?itag=22")),
            Some("user-1"),
            TIMEOUT
        )
        .await
        .unwrap();

        assert_eq!(result.download_url, "https://rr1.googlevideo.com/videoplayback?itag=22");
        assert!(result.direct_download);
        assert_eq!(result.file_name, "Never Gonna Give You Up.mp4");
        assert_eq!(result.video_id, "dQw4w9WgXcQ");
        assert_eq!(result.quality, "720p");

        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DownloadStatus::Completed);
        assert_eq!(records[0].user_id.as_deref(), Some("user-1"));
        assert_eq!(records[0].video_url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(records[0].size, "25 MB");
    }

    #[tokio::test]
    async fn test_dispatch_falls_back_to_watch_page() {
        let audit = RecordingAudit::default();
        let result = dispatch(&audit, &metadata("t"), &option(None), None, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(result.download_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(!result.direct_download);
    }

    #[tokio::test]
    async fn test_dispatch_survives_audit_failure() {
        let result = dispatch(&FailingAudit, &metadata("t"), &option(Some("https://x")), None, TIMEOUT).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_survives_slow_audit() {
        let result = dispatch(
            &SlowProvider,
            &metadata("t"),
            &option(Some("https://rr1.googlevideo.com/videoplayback?itag=22")),
            None,
            Duration::from_millis(20)
        )
        .await
        .unwrap();

        assert!(result.direct_download);
        assert_eq!(result.download_url, "https://rr1.googlevideo.com/videoplayback?itag=22");
    }

    #[tokio::test]
    async fn test_dispatch_fails_without_any_url() {
        let audit = RecordingAudit::default();
        let mut meta = metadata("t");
        meta.id = "not-an-id".to_string();
        meta.source_url = "garbage".to_string();

        let err = dispatch(&audit, &meta, &option(Some("   ")), None, TIMEOUT).await.unwrap_err();

        assert!(matches!(err, CoreError::DispatchFailed(_)));
        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DownloadStatus::Failed);
    }

    #[tokio::test]
    async fn test_dispatch_fails_without_url_even_if_audit_down() {
        let mut meta = metadata("t");
        meta.id = String::new();
        meta.source_url = String::new();

        let err = dispatch(&FailingAudit, &meta, &option(None), None, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, CoreError::DispatchFailed(_)));
    }
}
