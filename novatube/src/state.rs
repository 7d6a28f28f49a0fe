use std::sync::Arc;

use yt_dlp::YtDlp;

use crate::config::Config;
use crate::db::DbPool;
use crate::providers::{MetadataProvider, StreamProvider};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub http: reqwest::Client,
    pub yt_dlp: YtDlp,
    pub metadata: Arc<dyn MetadataProvider>,
    pub streams: Arc<dyn StreamProvider>,
    pub config: Arc<Config>
}
