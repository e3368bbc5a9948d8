//! HTTP handlers for Auth API

use auth_core::{
    extract_bearer_token, is_reset_code, normalize_identifier, validate_email, AuthError,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let req = parse_credentials(body)?;

    let token = state.auth.register(&req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::bearer(token, state.token_ttl_secs())),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let req = parse_credentials(body)?;

    match state.auth.login(&req.email, &req.password).await {
        Ok(token) => Ok(Json(TokenResponse::bearer(token, state.token_ttl_secs()))),
        Err(AuthError::AccountNotFound | AuthError::InvalidCredentials)
            if state.collapse_login_errors =>
        {
            Err(ApiError::AuthenticationFailed)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/verify
///
/// Validates the `Authorization: Bearer <token>` header.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = extract_bearer_token(auth_header).ok_or(ApiError::MissingToken)?;

    let claims = state.auth.verify_token(token)?;

    Ok(Json(claims.into()))
}

/// POST /auth/forgot-password
///
/// Emails a reset code. With `collapse_login_errors` the response does not
/// reveal whether the account exists.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    validate_email(&req.email).map_err(ApiError::InvalidRequest)?;

    let code = match state.auth.request_reset(&req.email).await {
        Ok(code) => code,
        Err(AuthError::AccountNotFound) if state.collapse_login_errors => {
            return Ok(reset_requested());
        }
        Err(e) => return Err(e.into()),
    };

    let recipient = normalize_identifier(&req.email);
    state
        .mailer
        .send_reset_code(&recipient, &code)
        .await
        .map_err(|e| {
            tracing::error!("Failed to send reset code to {}: {}", recipient, e);
            ApiError::MailDelivery
        })?;

    Ok(reset_requested())
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    validate_email(&req.email).map_err(ApiError::InvalidRequest)?;

    let code = req.code.trim();
    if !is_reset_code(code) {
        return Err(ApiError::InvalidRequest(
            "Reset code must be 6 digits".to_string(),
        ));
    }
    validate_password(&req.new_password)?;

    match state
        .auth
        .reset_secret(&req.email, code, &req.new_password)
        .await
    {
        Ok(()) => Ok(Json(MessageResponse::new(
            "Password reset successfully. You can now log in.",
        ))),
        Err(AuthError::AccountNotFound) if state.collapse_login_errors => {
            Err(AuthError::InvalidResetCode.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn reset_requested() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "If an account exists for this email, a reset code has been sent.",
        )),
    )
}

fn parse_credentials(
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    validate_email(&req.email).map_err(ApiError::InvalidRequest)?;
    validate_password(&req.password)?;

    Ok(req)
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::InvalidRequest("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "Password cannot exceed {} bytes",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}
