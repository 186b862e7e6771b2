//! API error types

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use snapfeed_auth::AuthError;
use snapfeed_db::DbError;
use snapfeed_storage::StorageError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Auth(e) => (e.status_code(), e.public_message()),
            ApiError::Database(_) => internal(),
            ApiError::Storage(e) => match e {
                StorageError::UnsupportedType(_)
                | StorageError::InvalidName(_)
                | StorageError::Empty => (StatusCode::BAD_REQUEST, e.to_string()),
                StorageError::Io(_) => internal(),
            },
            ApiError::Multipart(e) => (e.status(), e.body_text()),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
