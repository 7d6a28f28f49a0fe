use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Instagram
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Instagram => "Instagram"
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified video URL. `native_id` is empty for platforms whose ids are
/// not extracted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReference {
    pub platform: Platform,
    pub native_id: String,
    pub original_url: String
}

impl VideoReference {
    /// Canonical page URL for the video.
    pub fn watch_url(&self) -> String {
        match self.platform {
            Platform::YouTube => youtube_watch_url(&self.native_id),
            Platform::Instagram => self.original_url.clone()
        }
    }
}

pub fn youtube_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default, alias = "thumbnail")]
    pub thumbnail_url: String,
    /// `None` when the provider did not report a duration.
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub author: String,
    #[serde(alias = "url")]
    pub source_url: String
}

impl VideoMetadata {
    pub fn new(
        id: String,
        title: String,
        thumbnail_url: String,
        duration_seconds: Option<u64>,
        author: String,
        source_url: String
    ) -> Self {
        Self {
            id,
            title,
            thumbnail_url,
            duration_seconds,
            duration: format_duration(duration_seconds),
            author,
            source_url
        }
    }
}

pub fn format_duration(duration_seconds: Option<u64>) -> String {
    match duration_seconds {
        Some(secs) => {
            let hours = secs / 3600;
            let mins = (secs % 3600) / 60;
            let secs = secs % 60;
            if hours > 0 {
                format!("{hours}:{mins:02}:{secs:02}")
            } else {
                format!("{mins}:{secs:02}")
            }
        }
        None => String::from("Unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Webm,
    Mp3,
    Aac
}

impl Container {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mp3 => "mp3",
            Self::Aac => "aac"
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOption {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(alias = "format")]
    pub container: Container,
    #[serde(alias = "quality")]
    pub quality_label: String,
    #[serde(default)]
    pub approximate_size_bytes: Option<u64>,
    #[serde(default = "unknown_size")]
    pub size: String,
    #[serde(default, alias = "url")]
    pub source_url: Option<String>
}

fn unknown_size() -> String {
    String::from("Unknown")
}
