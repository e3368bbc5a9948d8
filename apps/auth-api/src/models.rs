//! Request and response bodies for Auth API

use auth_core::TokenClaims;
use serde::{Deserialize, Serialize};

/// Maximum accepted password length in bytes
pub const MAX_PASSWORD_LEN: usize = 1024;

/// Body of `/auth/register` and `/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Body of `/auth/forgot-password`
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body of `/auth/reset-password`
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn bearer(token: String, expires_in: u64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Claims of a verified token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<TokenClaims> for VerifyResponse {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
