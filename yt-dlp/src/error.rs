use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("yt-dlp binary not found: {0}")]
    BinaryNotFound(PathBuf),

    #[error("yt-dlp binary not executable: {0}")]
    BinaryNotExecutable(PathBuf),

    #[error("failed to execute yt-dlp: {0}")]
    ExecutionFailed(#[source] std::io::Error),

    #[error("yt-dlp command failed with exit code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("yt-dlp did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to parse JSON output: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("no formats available")]
    NoFormatsAvailable
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ExecutionFailed(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
