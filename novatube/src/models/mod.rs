mod download;
mod video;

pub use download::{DownloadRecord, DownloadStatus, NewDownloadRecord};
pub use video::{
    Container, FormatOption, Platform, VideoMetadata, VideoReference,
    youtube_thumbnail_url, youtube_watch_url
};
