use async_trait::async_trait;
use yt_dlp::{Format, YtDlp};

use super::{MetadataProvider, ProviderError, ProviderMetadata, ProviderStream, StreamProvider};
use crate::models::VideoReference;

/// Metadata and stream lists from the yt-dlp extraction library.
#[derive(Debug, Clone)]
pub struct YtDlpProvider {
    client: YtDlp
}

impl YtDlpProvider {
    pub fn new(client: YtDlp) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataProvider for YtDlpProvider {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, reference: &VideoReference) -> Result<ProviderMetadata, ProviderError> {
        let info = self.client.get_video_info(&target_url(reference)).await?;

        Ok(ProviderMetadata {
            author: info.author().map(String::from),
            thumbnail_url: info.best_thumbnail().map(String::from),
            duration_seconds: info.duration_seconds(),
            title: info.title
        })
    }
}

#[async_trait]
impl StreamProvider for YtDlpProvider {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn streams(&self, reference: &VideoReference) -> Result<Vec<ProviderStream>, ProviderError> {
        let formats = self.client.list_formats(&target_url(reference)).await?;
        tracing::debug!("yt-dlp reported {} formats for {}", formats.len(), reference.native_id);
        Ok(formats.iter().map(to_stream).collect())
    }
}

fn target_url(reference: &VideoReference) -> String {
    reference.watch_url()
}

fn to_stream(format: &Format) -> ProviderStream {
    let container = match format.ext.as_deref() {
        // m4a is audio in an MP4 container.
        Some("m4a") => "mp4".to_string(),
        Some(ext) => ext.to_ascii_lowercase(),
        None => String::new()
    };

    ProviderStream {
        container,
        quality_label: format.quality_label(),
        has_audio: format.has_audio(),
        has_video: format.has_video(),
        content_length: format.estimated_size().map(|s| s.to_string()),
        url: format.url.clone().filter(|_| format.is_direct())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::select_formats;
    use crate::models::Platform;

    fn format(json: &str) -> Format {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_muxed_format_to_stream() {
        let stream = to_stream(&format(
            r#"{"format_id":"18","ext":"mp4","height":360,"vcodec":"avc1.42001E","acodec":"mp4a.40.2","filesize":1048576,"url":"https://rr1.googlevideo.com/videoplayback?itag=18","protocol":"https"}"#
        ));
        assert_eq!(stream.container, "mp4");
        assert_eq!(stream.quality_label.as_deref(), Some("360p"));
        assert!(stream.has_audio && stream.has_video);
        assert_eq!(stream.content_length.as_deref(), Some("1048576"));
        assert!(stream.url.is_some());
    }

    #[test]
    fn test_portrait_short_lands_on_grid() {
        let stream = to_stream(&format(
            r#"{"format_id":"18","format_note":"360p","ext":"mp4","width":360,"height":640,"vcodec":"avc1.42001E","acodec":"mp4a.40.2","url":"https://rr1.googlevideo.com/videoplayback?itag=18","protocol":"https"}"#
        ));
        assert_eq!(stream.quality_label.as_deref(), Some("360p"));

        let options = select_formats(std::slice::from_ref(&stream));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "mp4-360p");
    }

    #[test]
    fn test_m4a_audio_maps_to_mp4() {
        let stream = to_stream(&format(
            r#"{"format_id":"140","ext":"m4a","vcodec":"none","acodec":"mp4a.40.2","url":"https://x","protocol":"https"}"#
        ));
        assert_eq!(stream.container, "mp4");
        assert!(stream.has_audio);
        assert!(!stream.has_video);
        assert_eq!(stream.quality_label, None);
    }

    #[test]
    fn test_manifest_urls_are_dropped() {
        let stream = to_stream(&format(
            r#"{"format_id":"95","ext":"mp4","height":720,"vcodec":"avc1","acodec":"mp4a","url":"https://manifest.googlevideo.com/x.m3u8","protocol":"m3u8_native"}"#
        ));
        assert_eq!(stream.url, None);
    }

    #[test]
    fn test_target_url_is_canonical_for_youtube() {
        let reference = VideoReference {
            platform: Platform::YouTube,
            native_id: "dQw4w9WgXcQ".to_string(),
            original_url: "https://youtu.be/dQw4w9WgXcQ?si=abc".to_string()
        };
        assert_eq!(target_url(&reference), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
