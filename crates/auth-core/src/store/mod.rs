//! Credential store contract
//!
//! A store maps normalized identifiers to [`AccountRecord`]s. Uniqueness of
//! the identifier is the store's job: `save` must check and write as one
//! atomic step, so two racing registrations cannot both persist a record.

use async_trait::async_trait;
use thiserror::Error;

use crate::account::AccountRecord;

mod memory;

pub use memory::MemoryCredentialStore;

/// Errors that can occur in a credential store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another record already holds this identifier
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// The record violates a store invariant (e.g. empty secret hash)
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Driver or connection failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Durable mapping from identifier to account record
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a record by identifier, without side effects
    async fn find_by_identifier(&self, identifier: &str)
        -> Result<Option<AccountRecord>, StoreError>;

    /// Persist a new record (`id == None`) or replace an existing one
    ///
    /// Fails with [`StoreError::DuplicateIdentifier`] if a different record
    /// already holds the identifier.
    async fn save(&self, record: AccountRecord) -> Result<AccountRecord, StoreError>;
}

/// Reject records that must never reach storage
///
/// Store implementations call this before writing.
pub fn validate_record(record: &AccountRecord) -> Result<(), StoreError> {
    if record.identifier.trim().is_empty() {
        return Err(StoreError::InvalidRecord("identifier is empty".to_string()));
    }
    if record.secret_hash.is_empty() {
        return Err(StoreError::InvalidRecord("secret hash is empty".to_string()));
    }
    Ok(())
}

