//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing session token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Session secret is not configured")]
    SecretNotConfigured,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            // Configuration problems are operator errors, not user errors;
            // they must not masquerade as bad credentials.
            AuthError::SecretNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication system not configured properly",
            ),
            AuthError::PasswordHash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
