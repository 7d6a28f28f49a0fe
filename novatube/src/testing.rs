//! Fakes and fixtures shared by the unit tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use yt_dlp::YtDlp;

use crate::config::Config;
use crate::db::DbPool;
use crate::dispatch::AuditSink;
use crate::models::{NewDownloadRecord, VideoReference};
use crate::providers::{
    MetadataProvider, ProviderError, ProviderMetadata, ProviderStream, StreamProvider
};
use crate::state::AppState;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn state(
    pool: DbPool,
    metadata: impl MetadataProvider + 'static,
    streams: impl StreamProvider + 'static,
    download_dir: &Path
) -> AppState {
    let config = Config {
        download_dir: download_dir.to_path_buf(),
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    };
    AppState {
        pool,
        http: reqwest::Client::new(),
        yt_dlp: YtDlp::with_binary("/nonexistent/yt-dlp"),
        metadata: Arc::new(metadata),
        streams: Arc::new(streams),
        config: Arc::new(config)
    }
}

pub struct FakeMetadata {
    result: Result<ProviderMetadata, String>
}

impl FakeMetadata {
    pub fn ok(metadata: ProviderMetadata) -> Self {
        Self { result: Ok(metadata) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string())
        }
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, _reference: &VideoReference) -> Result<ProviderMetadata, ProviderError> {
        self.result.clone().map_err(Into::into)
    }
}

pub struct FakeStreams {
    result: Result<Vec<ProviderStream>, String>
}

impl FakeStreams {
    pub fn ok(streams: Vec<ProviderStream>) -> Self {
        Self { result: Ok(streams) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string())
        }
    }
}

#[async_trait]
impl StreamProvider for FakeStreams {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn streams(&self, _reference: &VideoReference) -> Result<Vec<ProviderStream>, ProviderError> {
        self.result.clone().map_err(Into::into)
    }
}

/// Never answers within any test timeout.
pub struct SlowProvider;

#[async_trait]
impl MetadataProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch(&self, _reference: &VideoReference) -> Result<ProviderMetadata, ProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err("unreachable".into())
    }
}

#[async_trait]
impl StreamProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn streams(&self, _reference: &VideoReference) -> Result<Vec<ProviderStream>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err("unreachable".into())
    }
}

#[async_trait]
impl AuditSink for SlowProvider {
    async fn record(&self, _record: &NewDownloadRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    records: Mutex<Vec<NewDownloadRecord>>
}

impl RecordingAudit {
    pub fn records(&self) -> Vec<NewDownloadRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAudit {
    async fn record(&self, record: &NewDownloadRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingAudit;

#[async_trait]
impl AuditSink for FailingAudit {
    async fn record(&self, _record: &NewDownloadRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("database is locked".into())
    }
}

fn stream(container: &str, quality: Option<&str>, has_audio: bool, has_video: bool) -> ProviderStream {
    let tag = quality.unwrap_or("audio");
    ProviderStream {
        container: container.to_string(),
        quality_label: quality.map(String::from),
        has_audio,
        has_video,
        content_length: Some("1048576".to_string()),
        url: Some(format!("https://cdn.example.com/{container}/{tag}"))
    }
}

pub fn muxed(container: &str, quality: &str) -> ProviderStream {
    stream(container, Some(quality), true, true)
}

pub fn video_only(container: &str, quality: &str) -> ProviderStream {
    stream(container, Some(quality), false, true)
}

pub fn audio_only(container: &str) -> ProviderStream {
    stream(container, None, true, false)
}
