use axum::{
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    response::{IntoResponse, Json}
};
use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::dispatch::{self, DispatchResult};
use crate::error::AppError;
use crate::formats::resolve_formats;
use crate::metadata::fetch_metadata;
use crate::models::{DownloadRecord, FormatOption, VideoMetadata};
use crate::state::AppState;
use crate::transfer::{self, TransferOutcome};

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    url: Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    video_info: Option<VideoMetadata>,
    format: Option<FormatOption>,
    user_id: Option<String>
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    success: bool,
    #[serde(flatten)]
    result: DispatchResult
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    download_url: Option<String>,
    file_name: Option<String>
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    success: bool,
    #[serde(flatten)]
    outcome: TransferOutcome
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    user_id: Option<String>,
    limit: Option<i64>
}

fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(message))
}

#[tracing::instrument(skip(state))]
pub async fn video_info(
    State(state): State<AppState>,
    payload: Result<Json<VideoRequest>, JsonRejection>
) -> Result<Json<VideoMetadata>, AppError> {
    let Json(input) = payload?;
    let url = required(input.url, "URL is required")?;

    let reference = classify(&url)?;
    let metadata =
        fetch_metadata(state.metadata.as_ref(), &reference, state.config.request_timeout).await?;

    Ok(Json(metadata))
}

#[tracing::instrument(skip(state))]
pub async fn video_formats(
    State(state): State<AppState>,
    payload: Result<Json<VideoRequest>, JsonRejection>
) -> Result<Json<Vec<FormatOption>>, AppError> {
    let Json(input) = payload?;
    let url = required(input.url, "URL is required")?;

    let reference = classify(&url)?;
    let options =
        resolve_formats(state.streams.as_ref(), &reference, state.config.request_timeout).await?;

    Ok(Json(options))
}

#[tracing::instrument(skip(state))]
pub async fn video_download(
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>
) -> Result<Json<DispatchResponse>, AppError> {
    let Json(input) = payload?;
    let (Some(metadata), Some(chosen)) = (input.video_info, input.format) else {
        return Err(AppError::bad_request("Video info and format are required"));
    };
    let user_id = input.user_id.filter(|u| !u.trim().is_empty());

    let result = dispatch::dispatch(
        &state.pool,
        &metadata,
        &chosen,
        user_id.as_deref(),
        state.config.request_timeout
    )
    .await?;

    Ok(Json(DispatchResponse {
        success: true,
        result
    }))
}

#[tracing::instrument(skip(state))]
pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>
) -> Result<Json<TransferResponse>, AppError> {
    let Json(input) = payload?;
    let download_url = required(input.download_url, "Download URL is required")?;
    let file_name = required(input.file_name, "File name is required")?;

    let outcome = transfer::execute(
        &state.http,
        &download_url,
        &file_name,
        &state.config.download_dir
    )
    .await?;

    Ok(Json(TransferResponse {
        success: true,
        outcome
    }))
}

#[tracing::instrument(skip(state))]
pub async fn download_history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>
) -> Result<Json<Vec<DownloadRecord>>, AppError> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let records = DownloadRecord::find_recent(&state.pool, query.user_id.as_deref(), limit).await?;
    Ok(Json(records))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let version = state.yt_dlp.check_binary().await.ok();
    Json(serde_json::json!({
        "status": "ok",
        "ytDlp": version
    }))
}
