use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{field} must be a finite number >= 0")]
    NegativeOrNonFinite { field: String },
    #[error("{field} must be a finite number")]
    NonFinite { field: String },
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid timestamp for {field}: {value:?}")]
    InvalidTimestamp { field: String, value: String },
    #[error("invalid JSON payload: {0}")]
    BadJson(String),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode report: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("Not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ReadFile { .. } | ApiError::Encode(_) | ApiError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            log::warn!("rejected request: {self}");
        } else {
            log::error!("request failed: {self}");
        }
        super::json_response(
            status,
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}
