//! In-memory credential store
//!
//! Used for tests and local development. Uniqueness holds because the
//! lookup and the insert happen under the same write lock.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{validate_record, CredentialStore, StoreError};
use crate::account::{normalize_identifier, AccountRecord};

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let key = normalize_identifier(identifier);
        Ok(self.accounts.read().await.get(&key).cloned())
    }

    async fn save(&self, record: AccountRecord) -> Result<AccountRecord, StoreError> {
        validate_record(&record)?;
        let identifier = normalize_identifier(&record.identifier);

        let mut accounts = self.accounts.write().await;

        if let Some(existing) = accounts.get(&identifier) {
            if record.id.is_none() || existing.id != record.id {
                return Err(StoreError::DuplicateIdentifier(identifier));
            }
        }

        let id = match record.id {
            Some(id) => {
                // A replacement may move the record to a new identifier.
                accounts.retain(|_, r| r.id.as_deref() != Some(id.as_str()));
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        let saved = AccountRecord {
            id: Some(id),
            identifier: identifier.clone(),
            ..record
        };
        accounts.insert(identifier, saved.clone());

        Ok(saved)
    }
}
