//! Registration, login and password reset orchestration
//!
//! The `Authenticator` combines a store, a hasher and a token issuer into the
//! public flows. It holds no mutable state and is cheap to clone, so one
//! instance built at startup serves every request.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

use crate::account::{normalize_identifier, AccountRecord};
use crate::error::AuthError;
use crate::hasher::SecretHasher;
use crate::reset::{generate_reset_code, PendingReset, DEFAULT_RESET_CODE_TTL};
use crate::store::{CredentialStore, StoreError};
use crate::token::{TokenClaims, TokenIssuer};

#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn SecretHasher>,
    issuer: Arc<TokenIssuer>,
    reset_ttl: Duration,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn SecretHasher>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            reset_ttl: DEFAULT_RESET_CODE_TTL,
        }
    }

    /// Override how long reset codes stay redeemable
    pub fn with_reset_ttl(mut self, reset_ttl: Duration) -> Self {
        self.reset_ttl = reset_ttl;
        self
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Create an account and return a token for it
    ///
    /// The existence check is only a fast path; the store's atomic `save`
    /// decides races, and a lost race reports `AccountAlreadyExists` too.
    pub async fn register(&self, identifier: &str, secret: &str) -> Result<String, AuthError> {
        let identifier = normalize_identifier(identifier);

        if self.find(&identifier).await?.is_some() {
            return Err(AuthError::AccountAlreadyExists);
        }

        let secret_hash = self.hash_secret(secret).await?;

        match self
            .store
            .save(AccountRecord::new(identifier.clone(), secret_hash))
            .await
        {
            Ok(saved) => {
                tracing::info!(
                    "Registered account {} ({})",
                    saved.identifier,
                    saved.id.as_deref().unwrap_or_default()
                );
            }
            Err(StoreError::DuplicateIdentifier(_)) => {
                tracing::warn!("Concurrent registration lost the race for {}", identifier);
                return Err(AuthError::AccountAlreadyExists);
            }
            Err(e) => {
                tracing::error!("Failed to save account {}: {}", identifier, e);
                return Err(AuthError::Internal(e.to_string()));
            }
        }

        Ok(self.issuer.issue(&identifier)?)
    }

    /// Check credentials and return a token
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<String, AuthError> {
        let identifier = normalize_identifier(identifier);

        let record = self
            .find(&identifier)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !self.verify_secret(secret, &record.secret_hash).await? {
            tracing::warn!("Failed login for {}", identifier);
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("Login succeeded for {}", identifier);
        Ok(self.issuer.issue(&identifier)?)
    }

    /// Verify a token issued by this authenticator
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.issuer.verify(token).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::from(e)
        })
    }

    /// Start a password reset and return the code to deliver
    ///
    /// A new request replaces any outstanding code for the account.
    pub async fn request_reset(&self, identifier: &str) -> Result<Zeroizing<String>, AuthError> {
        let identifier = normalize_identifier(identifier);

        let mut record = self
            .find(&identifier)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let code = generate_reset_code();
        let code_hash = self.hash_secret(&code).await?;
        let ttl = chrono::Duration::from_std(self.reset_ttl)
            .map_err(|e| AuthError::Internal(format!("Reset TTL out of range: {}", e)))?;

        record.pending_reset = Some(PendingReset {
            code_hash,
            expires_at: Utc::now() + ttl,
        });
        self.persist(record).await?;

        tracing::info!("Password reset requested for {}", identifier);
        Ok(code)
    }

    /// Redeem a reset code and replace the account's secret
    ///
    /// The code is cleared on success, so each code works once.
    pub async fn reset_secret(
        &self,
        identifier: &str,
        code: &str,
        new_secret: &str,
    ) -> Result<(), AuthError> {
        let identifier = normalize_identifier(identifier);

        let mut record = self
            .find(&identifier)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let Some(pending) = record.pending_reset.take() else {
            tracing::warn!("Reset attempted without a pending code for {}", identifier);
            return Err(AuthError::InvalidResetCode);
        };

        if pending.is_expired_at(Utc::now()) {
            tracing::warn!("Expired reset code used for {}", identifier);
            return Err(AuthError::InvalidResetCode);
        }

        if !self.verify_secret(code, &pending.code_hash).await? {
            tracing::warn!("Wrong reset code for {}", identifier);
            return Err(AuthError::InvalidResetCode);
        }

        record.secret_hash = self.hash_secret(new_secret).await?;
        self.persist(record).await?;

        tracing::info!("Password reset completed for {}", identifier);
        Ok(())
    }

    async fn find(&self, identifier: &str) -> Result<Option<AccountRecord>, AuthError> {
        self.store.find_by_identifier(identifier).await.map_err(|e| {
            tracing::error!("Account lookup failed for {}: {}", identifier, e);
            AuthError::Internal(e.to_string())
        })
    }

    async fn persist(&self, record: AccountRecord) -> Result<AccountRecord, AuthError> {
        let identifier = record.identifier.clone();
        self.store.save(record).await.map_err(|e| {
            tracing::error!("Failed to update account {}: {}", identifier, e);
            AuthError::Internal(e.to_string())
        })
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    async fn hash_secret(&self, secret: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = Zeroizing::new(secret.to_owned());

        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    async fn verify_secret(&self, secret: &str, secret_hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = Zeroizing::new(secret.to_owned());
        let secret_hash = secret_hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&secret, &secret_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))
    }
}
