use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response}
};

use crate::models::Platform;

/// Failures of the lookup, dispatch and transfer operations. None of them is
/// retried here; the caller decides whether to try again.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("only YouTube and Instagram URLs are supported, got host {0}")]
    UnsupportedPlatform(String),

    #[error("could not extract a video id from {0}")]
    IdExtractionFailed(String),

    #[error("{0} videos are not yet supported")]
    PlatformNotImplemented(Platform),

    #[error("could not fetch video information: {0}")]
    MetadataUnavailable(String),

    #[error("could not fetch video formats: {0}")]
    FormatsUnavailable(String),

    #[error("failed to process download: {0}")]
    DispatchFailed(String),

    #[error("transfer failed: {reason}")]
    TransferFailed { status: Option<u16>, reason: String }
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_)
            | Self::UnsupportedPlatform(_)
            | Self::IdExtractionFailed(_)
            | Self::PlatformNotImplemented(_) => StatusCode::BAD_REQUEST,
            Self::MetadataUnavailable(_)
            | Self::FormatsUnavailable(_)
            | Self::DispatchFailed(_)
            | Self::TransferFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub message: String,
    pub status: StatusCode
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::BAD_REQUEST
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("handler error: {}", self.message);
        (
            self.status,
            Json(serde_json::json!({ "error": self.message }))
        )
            .into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string()
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::bad_request(format!("invalid request body: {}", err.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::bad_request(format!("invalid query: {}", err.body_text()))
    }
}
