//! Application state for Auth API

use anyhow::Result;
use auth_core::{Authenticator, TokenIssuer};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::mailer::{LogMailer, ResendMailer, ResetMailer};
use crate::store::SqliteCredentialStore;

pub struct AppState {
    pub auth: Authenticator,
    /// Present unknown accounts and wrong passwords as one failure
    pub collapse_login_errors: bool,
    pub mailer: Arc<dyn ResetMailer>,
}

impl AppState {
    /// Connect to the database and wire the authenticator
    pub async fn new(config: &AppConfig) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;

        let store = SqliteCredentialStore::new(pool);
        store.run_migrations().await?;

        let issuer = TokenIssuer::new(config.signing_key.clone(), config.token_ttl);
        let auth = Authenticator::new(
            Arc::new(store),
            Arc::new(config.hasher()?),
            Arc::new(issuer),
        )
        .with_reset_ttl(config.reset_code_ttl);

        let mailer: Arc<dyn ResetMailer> = match &config.mail.resend_api_key {
            Some(api_key) => Arc::new(ResendMailer::new(
                api_key.clone(),
                config.mail.from_address.clone(),
                config.reset_code_ttl.as_secs() / 60,
            )),
            None => {
                tracing::warn!("RESEND_API_KEY not set; reset codes will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::from_parts(auth, config.collapse_login_errors, mailer))
    }

    pub fn from_parts(
        auth: Authenticator,
        collapse_login_errors: bool,
        mailer: Arc<dyn ResetMailer>,
    ) -> Self {
        Self {
            auth,
            collapse_login_errors,
            mailer,
        }
    }

    /// Token lifetime reported to clients as `expires_in`
    pub fn token_ttl_secs(&self) -> u64 {
        self.auth.issuer().lifetime().as_secs()
    }
}
