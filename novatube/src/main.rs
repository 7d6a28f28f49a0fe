mod classifier;
mod config;
mod db;
mod dispatch;
mod error;
mod formats;
mod handlers;
mod metadata;
mod models;
mod providers;
mod state;
#[cfg(test)]
mod testing;
mod transfer;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post}
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yt_dlp::YtDlp;

use config::{Config, MetadataBackend};
use handlers::api;
use providers::{MetadataProvider, OEmbedProvider, YtDlpProvider};
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "novatube=info,tower_http=debug".into())
        )
        .init();

    let config = Config::from_env();

    let pool = db::init_pool(&config.database_path).await?;
    tracing::info!("Database initialized at {}", config.database_path);

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(concat!("novatube/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut yt_dlp = YtDlp::with_binary(&config.ytdlp_path).with_timeout(config.request_timeout);

    if let Some(ref cookies_path) = config.ytdlp_cookies {
        if cookies_path.exists() {
            yt_dlp.set_cookies_file(Some(cookies_path.clone()));
            tracing::info!("Using cookies file: {}", cookies_path.display());
        } else {
            tracing::warn!("Cookies file {} does not exist, ignoring", cookies_path.display());
        }
    }

    if !config.ytdlp_extra_args.is_empty() {
        tracing::info!("Passing extra yt-dlp arguments: {:?}", config.ytdlp_extra_args);
        yt_dlp.set_extra_args(config.ytdlp_extra_args.clone());
    }

    match yt_dlp.check_binary().await {
        Ok(version) => tracing::info!("yt-dlp version: {}", version),
        Err(e) => tracing::warn!("yt-dlp not found or not executable: {}", e)
    }

    let ytdlp_provider = YtDlpProvider::new(yt_dlp.clone());
    let metadata: Arc<dyn MetadataProvider> = match config.metadata_backend {
        MetadataBackend::OEmbed => Arc::new(OEmbedProvider::new(http.clone(), config.oembed_endpoint.clone())),
        MetadataBackend::YtDlp => Arc::new(ytdlp_provider.clone())
    };
    tracing::info!("Metadata provider: {}", metadata.name());

    let port = config.port;
    let state = AppState {
        pool,
        http,
        yt_dlp,
        metadata,
        streams: Arc::new(ytdlp_provider),
        config: Arc::new(config)
    };

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/video-info", post(api::video_info))
        .route("/api/video-formats", post(api::video_formats))
        .route("/api/video-download", post(api::video_download))
        .route("/api/transfer", post(api::transfer))
        .route("/api/downloads", get(api::download_history))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
