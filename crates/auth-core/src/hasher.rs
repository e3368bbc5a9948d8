//! Password hashing using Argon2id
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$digest`), so
//! the salt and cost parameters travel with the digest and older hashes keep
//! verifying after the configured cost changes.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

/// Hashing failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to hash secret: {0}")]
    Hashing(String),
}

/// One-way, salted hashing of plaintext secrets
pub trait SecretHasher: Send + Sync {
    /// Hash a plaintext secret with a fresh random salt
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Check a plaintext secret against a stored hash
    ///
    /// Returns `false` for a mismatch and for an unparsable hash.
    fn verify(&self, plaintext: &str, secret_hash: &str) -> bool;
}

/// Argon2id hasher with tunable cost
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Hasher {
    /// Build a hasher with explicit cost parameters
    ///
    /// # Arguments
    /// * `m_cost` - Memory size in KiB
    /// * `t_cost` - Number of iterations
    /// * `p_cost` - Degree of parallelism
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| HashError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    fn verify(&self, plaintext: &str, secret_hash: &str) -> bool {
        // Parameters come from the PHC string, not from `self.params`.
        match PasswordHash::new(secret_hash) {
            Ok(parsed_hash) => self
                .argon2()
                .verify_password(plaintext.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}
