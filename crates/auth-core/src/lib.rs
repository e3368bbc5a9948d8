//! Credential authentication core
//!
//! This crate provides:
//! - Account records and identifier normalization
//! - The `CredentialStore` contract and an in-memory store
//! - Argon2id password hashing behind the `SecretHasher` trait
//! - HS256 bearer token issuance and verification
//! - The `Authenticator` orchestrating register/login and password resets

pub mod account;
pub mod error;
pub mod hasher;
pub mod reset;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use account::{normalize_identifier, validate_email, AccountRecord};
pub use error::AuthError;
pub use hasher::{Argon2Hasher, HashError, SecretHasher};
pub use reset::{generate_reset_code, is_reset_code, PendingReset, DEFAULT_RESET_CODE_TTL};
pub use service::Authenticator;
pub use store::{CredentialStore, MemoryCredentialStore, StoreError};
pub use token::{extract_bearer_token, SigningKey, TokenClaims, TokenError, TokenIssuer};
