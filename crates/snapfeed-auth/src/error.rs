//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use snapfeed_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already taken")]
    DuplicateUser,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing session cookie")]
    MissingSession,

    #[error("Not the owner of this resource")]
    Forbidden,

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::MissingSession => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::ResourceNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::PasswordHash(_)
            | AuthError::Jwt(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client
    pub fn public_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid username or password".to_string(),
            AuthError::DuplicateUser => "Username already taken".to_string(),
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::MissingSession => {
                "Unauthorized".to_string()
            }
            AuthError::Forbidden => "You cannot modify another user's post".to_string(),
            AuthError::ResourceNotFound => "Post not found".to_string(),
            AuthError::InvalidInput(msg) => msg.clone(),
            AuthError::PasswordHash(_)
            | AuthError::Jwt(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "error": self.public_message()
        }));

        (self.status_code(), body).into_response()
    }
}
