//! Auth API - HTTP boundary for the credential authentication core
//!
//! Provides REST endpoints for:
//! - Account registration
//! - Login
//! - Bearer token verification
//! - Password reset by emailed code

pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use routes::router;
pub use state::AppState;
