//! Auth API Server - account registration and bearer token issuance

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use auth_api::{router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auth_api=info".parse()?)
                .add_directive("auth_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing Auth API...");
    let config = AppConfig::from_env()?;
    let state = Arc::new(AppState::new(&config).await?);

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting Auth API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
