//! Error taxonomy for the authentication core

use thiserror::Error;

use crate::hasher::HashError;
use crate::token::TokenError;

/// Failures surfaced by [`Authenticator`](crate::service::Authenticator)
///
/// Callers match on the variant; the message text is for humans only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("An account with this identifier already exists")]
    AccountAlreadyExists,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token signature does not match")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Reset code missing, wrong or past its expiry
    #[error("Invalid or expired reset code")]
    InvalidResetCode,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable kind
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            AuthError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::BadSignature => "BAD_SIGNATURE",
            AuthError::Expired => "TOKEN_EXPIRED",
            AuthError::Malformed(_) => "MALFORMED_TOKEN",
            AuthError::InvalidResetCode => "INVALID_RESET_CODE",
            AuthError::Internal(_) => "INTERNAL",
        }
    }

    /// Token verification failures, as opposed to account failures
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::BadSignature | AuthError::Expired | AuthError::Malformed(_)
        )
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::BadSignature => AuthError::BadSignature,
            TokenError::Expired => AuthError::Expired,
            TokenError::Malformed(reason) => AuthError::Malformed(reason),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
