//! SQLite-backed credential store
//!
//! Identifier uniqueness is a `UNIQUE` index; a violation on insert is
//! reported as `DuplicateIdentifier`, so racing registrations resolve inside
//! the database.

use async_trait::async_trait;
use auth_core::store::validate_record;
use auth_core::{normalize_identifier, AccountRecord, CredentialStore, PendingReset, StoreError};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use uuid::Uuid;

/// Account row stored in database
#[derive(Debug, Clone, FromRow)]
struct DbAccount {
    id: String,
    identifier: String,
    secret_hash: String,
    created_at: DateTime<Utc>,
    reset_code_hash: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
}

impl From<DbAccount> for AccountRecord {
    fn from(row: DbAccount) -> Self {
        let pending_reset = match (row.reset_code_hash, row.reset_expires_at) {
            (Some(code_hash), Some(expires_at)) => Some(PendingReset {
                code_hash,
                expires_at,
            }),
            _ => None,
        };

        AccountRecord {
            id: Some(row.id),
            identifier: row.identifier,
            secret_hash: row.secret_hash,
            created_at: row.created_at,
            pending_reset,
        }
    }
}

pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                identifier TEXT NOT NULL,
                secret_hash TEXT NOT NULL CHECK (length(secret_hash) > 0),
                created_at TEXT NOT NULL,
                reset_code_hash TEXT,
                reset_expires_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Uniqueness of the natural key lives here, not in the caller
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_identifier ON accounts(identifier)
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}

fn backend_error(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let account: Option<DbAccount> = sqlx::query_as(
            r#"
            SELECT id, identifier, secret_hash, created_at, reset_code_hash, reset_expires_at
            FROM accounts
            WHERE identifier = ?
            "#,
        )
        .bind(normalize_identifier(identifier))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(account.map(AccountRecord::from))
    }

    async fn save(&self, record: AccountRecord) -> Result<AccountRecord, StoreError> {
        validate_record(&record)?;

        let identifier = normalize_identifier(&record.identifier);
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Single statement: a new id inserts, a known id replaces in place.
        // Either way the identifier index rejects a clash with another row.
        let result = sqlx::query(
            r#"
            INSERT INTO accounts
                (id, identifier, secret_hash, created_at, reset_code_hash, reset_expires_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                identifier = excluded.identifier,
                secret_hash = excluded.secret_hash,
                reset_code_hash = excluded.reset_code_hash,
                reset_expires_at = excluded.reset_expires_at
            "#,
        )
        .bind(&id)
        .bind(&identifier)
        .bind(&record.secret_hash)
        .bind(record.created_at)
        .bind(record.pending_reset.as_ref().map(|r| r.code_hash.as_str()))
        .bind(record.pending_reset.as_ref().map(|r| r.expires_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(AccountRecord {
                id: Some(id),
                identifier,
                ..record
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateIdentifier(identifier))
            }
            Err(e) => Err(backend_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_core::{Argon2Hasher, AuthError, Authenticator, SigningKey, TokenIssuer};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use std::time::Duration;

    async fn memory_store() -> SqliteCredentialStore {
        // One connection: every `sqlite::memory:` connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteCredentialStore::new(pool);
        store.run_migrations().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = memory_store().await;

        let saved = store
            .save(AccountRecord::new("A@X.com", "$argon2id$hash"))
            .await
            .unwrap();
        assert!(saved.is_persisted());
        assert_eq!(saved.identifier, "a@x.com");

        let found = store.find_by_identifier(" a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.secret_hash, "$argon2id$hash");
        assert_eq!(found.created_at.timestamp(), saved.created_at.timestamp());

        assert!(store.find_by_identifier("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate() {
        let store = memory_store().await;
        store.save(AccountRecord::new("a@x.com", "h1")).await.unwrap();

        let err = store
            .save(AccountRecord::new("a@x.com", "h2"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateIdentifier("a@x.com".to_string()));

        let found = store.find_by_identifier("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.secret_hash, "h1");
    }

    #[tokio::test]
    async fn test_replacement_by_id() {
        let store = memory_store().await;
        let saved = store.save(AccountRecord::new("a@x.com", "h1")).await.unwrap();

        store
            .save(AccountRecord {
                secret_hash: "h2".to_string(),
                ..saved.clone()
            })
            .await
            .unwrap();

        let found = store.find_by_identifier("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.secret_hash, "h2");
    }

    #[tokio::test]
    async fn test_pending_reset_round_trips_and_clears() {
        let store = memory_store().await;
        let saved = store.save(AccountRecord::new("a@x.com", "h1")).await.unwrap();
        let expires_at = Utc::now() + chrono::Duration::minutes(30);

        store
            .save(AccountRecord {
                pending_reset: Some(PendingReset {
                    code_hash: "$argon2id$code".to_string(),
                    expires_at,
                }),
                ..saved.clone()
            })
            .await
            .unwrap();

        let found = store.find_by_identifier("a@x.com").await.unwrap().unwrap();
        let pending = found.pending_reset.clone().unwrap();
        assert_eq!(pending.code_hash, "$argon2id$code");
        assert_eq!(pending.expires_at.timestamp(), expires_at.timestamp());

        store
            .save(AccountRecord {
                pending_reset: None,
                ..found
            })
            .await
            .unwrap();
        let cleared = store.find_by_identifier("a@x.com").await.unwrap().unwrap();
        assert!(cleared.pending_reset.is_none());
    }

    #[tokio::test]
    async fn test_reset_flow_updates_row_in_place() {
        let store = Arc::new(memory_store().await);
        let auth = Authenticator::new(
            store.clone(),
            Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
            Arc::new(TokenIssuer::new(
                SigningKey::from_bytes(vec![3u8; 32]).unwrap(),
                Duration::from_secs(60),
            )),
        );
        auth.register("a@x.com", "old").await.unwrap();

        let code = auth.request_reset("a@x.com").await.unwrap();
        auth.reset_secret("a@x.com", &code, "new").await.unwrap();
        assert!(auth.login("a@x.com", "new").await.is_ok());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_empty_hash_rejected() {
        let store = memory_store().await;
        let err = store.save(AccountRecord::new("a@x.com", "")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_single_winner() {
        let store = Arc::new(memory_store().await);
        let auth = Authenticator::new(
            store.clone(),
            Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
            Arc::new(TokenIssuer::new(
                SigningKey::from_bytes(vec![3u8; 32]).unwrap(),
                Duration::from_secs(60),
            )),
        );

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let auth = auth.clone();
                tokio::spawn(async move { auth.register("race@x.com", &format!("pw{}", i)).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert_eq!(e, AuthError::AccountAlreadyExists),
            }
        }
        assert_eq!(winners, 1);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
