//! Route table for Auth API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub const HEALTH: &str = "/health";
pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const VERIFY: &str = "/auth/verify";
pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/auth/reset-password";

/// Build the router for every endpoint
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(HEALTH, get(handlers::health))
        .route(REGISTER, post(handlers::register))
        .route(LOGIN, post(handlers::login))
        .route(VERIFY, get(handlers::verify))
        .route(FORGOT_PASSWORD, post(handlers::forgot_password))
        .route(RESET_PASSWORD, post(handlers::reset_password))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
