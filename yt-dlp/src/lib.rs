//! Async Rust wrapper for the yt-dlp CLI, limited to metadata extraction.
//!
//! Every invocation runs with a wall-clock bound; a run that exceeds it is
//! killed and reported as [`Error::Timeout`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use yt_dlp::YtDlp;
//!
//! #[tokio::main]
//! async fn main() -> yt_dlp::Result<()> {
//!     let client = YtDlp::new().with_timeout(Duration::from_secs(30));
//!
//!     let version = client.check_binary().await?;
//!     println!("yt-dlp version: {}", version);
//!
//!     let info = client.get_video_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     println!("Title: {}", info.title);
//!
//!     for format in info.formats.iter().filter(|f| f.has_audio() && f.has_video()) {
//!         println!("{} {:?}", format.format_id, format.quality_label());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod command;
pub mod error;
pub mod types;

pub use client::YtDlp;
pub use error::{Error, Result};
pub use types::{Format, Thumbnail, VideoInfo};
