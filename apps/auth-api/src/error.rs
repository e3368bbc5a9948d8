//! Error types for Auth API
//!
//! `status_for` is the single table from core error kinds to HTTP status.

use auth_core::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing bearer token")]
    MissingToken,

    /// Not-found and wrong-password, reported without telling them apart
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Failed to deliver reset email")]
    MailDelivery,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// HTTP status for each core error kind
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::AccountAlreadyExists => StatusCode::CONFLICT,
        AuthError::AccountNotFound => StatusCode::UNAUTHORIZED,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::BadSignature => StatusCode::UNAUTHORIZED,
        AuthError::Expired => StatusCode::UNAUTHORIZED,
        AuthError::Malformed(_) => StatusCode::UNAUTHORIZED,
        AuthError::InvalidResetCode => StatusCode::BAD_REQUEST,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    /// Status, machine code and client-facing message
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_TOKEN",
                "Missing bearer token".to_string(),
            ),
            ApiError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                "Authentication failed".to_string(),
            ),
            ApiError::MailDelivery => (
                StatusCode::BAD_GATEWAY,
                "MAIL_DELIVERY_FAILED",
                "Couldn't send the reset email. Try again in a bit.".to_string(),
            ),
            ApiError::Auth(AuthError::Internal(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error".to_string(),
            ),
            ApiError::Auth(e) => (status_for(e), e.code(), e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Auth(AuthError::Internal(e)) = &self {
            tracing::error!("Internal error: {}", e);
        }

        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": message,
            "code": code,
            "status": status.as_u16(),
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}
