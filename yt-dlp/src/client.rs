use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use crate::command::{CommandBuilder, output_with_timeout};
use crate::error::{Error, Result};
use crate::types::{Format, VideoInfo};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    cookies_file: Option<PathBuf>,
    extra_args: Vec<String>,
    timeout: Duration
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary: path.into(),
            cookies_file: None,
            extra_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_cookies_file(&mut self, path: Option<PathBuf>) {
        self.cookies_file = path;
    }

    pub fn set_extra_args(&mut self, args: Vec<String>) {
        self.extra_args = args;
    }

    pub async fn check_binary(&self) -> Result<String> {
        let cmd = CommandBuilder::new(&self.binary)
            .arg("--version")
            .build();
        let output = self.run(cmd).await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(Error::BinaryNotExecutable(self.binary.clone()))
        }
    }

    pub async fn get_video_info(&self, url: &str) -> Result<VideoInfo> {
        let cmd = self
            .command()
            .json_output()
            .skip_download()
            .no_playlist()
            .no_warnings()
            .url(url)
            .build();

        tracing::debug!(binary = %self.binary.display(), url, "fetching video info");

        let output = self.run(cmd).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(Error::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr
            });
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }

    pub async fn list_formats(&self, url: &str) -> Result<Vec<Format>> {
        let info = self.get_video_info(url).await?;
        if info.formats.is_empty() {
            Err(Error::NoFormatsAvailable)
        } else {
            Ok(info.formats)
        }
    }

    async fn run(&self, cmd: tokio::process::Command) -> Result<Output> {
        output_with_timeout(cmd, self.timeout)
            .await
            .map_err(|e| match e {
                Error::ExecutionFailed(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    Error::BinaryNotFound(self.binary.clone())
                }
                other => other
            })
    }

    fn command(&self) -> CommandBuilder {
        CommandBuilder::new(&self.binary)
            .cookies_file_opt(self.cookies_file.as_ref())
            .args(self.extra_args.iter().map(String::as_str))
    }
}
