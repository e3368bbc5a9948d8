//! Bearer token issuance and verification
//!
//! Tokens are compact JWTs signed with HS256:
//!
//! - header: `{"alg":"HS256","typ":"JWT"}`
//! - payload: `{"sub": <identifier>, "iat": <unix seconds>, "exp": <unix seconds>}`
//! - encoding: base64url without padding, `header.payload.signature`
//!
//! Any JWT library holding the same key can validate them.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Minimum signing key length in bytes (256 bits)
pub const MIN_KEY_LEN: usize = 32;

const ALGORITHM: &str = "HS256";

/// Token failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Signing key must be at least {min} bytes, got {len}")]
    KeyTooShort { len: usize, min: usize },

    #[error("Signing key is not valid base64")]
    InvalidKeyEncoding,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Process-wide symmetric signing key, provisioned at startup
///
/// The bytes are wiped on drop and never printed.
#[derive(Clone)]
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < MIN_KEY_LEN {
            return Err(TokenError::KeyTooShort {
                len: bytes.len(),
                min: MIN_KEY_LEN,
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a base64 key (standard or URL-safe alphabet, padding optional)
    pub fn from_base64(encoded: &str) -> Result<Self, TokenError> {
        let trimmed = encoded.trim();
        let bytes = STANDARD
            .decode(trimmed)
            .or_else(|_| URL_SAFE.decode(trimmed))
            .or_else(|_| URL_SAFE_NO_PAD.decode(trimmed))
            .map_err(|_| TokenError::InvalidKeyEncoding)?;
        Self::from_bytes(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.0).map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey([REDACTED; {} bytes])", self.0.len())
    }
}

/// JWT header for HS256
#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (normalized identifier)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Mints and validates signed, time-bounded tokens
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(key: SigningKey, lifetime: Duration) -> Self {
        Self { key, lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject`, valid from now for the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs())
            .map_err(|_| TokenError::Signing("token lifetime out of range".to_string()))?;

        let claims = TokenClaims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(lifetime),
        };

        self.encode(&claims)
    }

    /// Verify a token against the current time and return its claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    ///
    /// The MAC covers everything before the last dot, separators included,
    /// and is checked before anything is decoded. Any altered byte of a
    /// signed token is therefore `BadSignature`; only input with no dot at
    /// all is rejected as `Malformed` up front.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let Some((signing_input, signature_b64)) = token.rsplit_once('.') else {
            return Err(TokenError::Malformed(
                "expected dot-separated segments".to_string(),
            ));
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::BadSignature)?;

        let mut mac = self.key.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let (header_b64, payload_b64) = match signing_input.split_once('.') {
            Some((header, payload))
                if !header.is_empty() && !payload.is_empty() && !payload.contains('.') =>
            {
                (header, payload)
            }
            _ => {
                return Err(TokenError::Malformed(
                    "expected three dot-separated segments".to_string(),
                ))
            }
        };

        let header: JwtHeader = decode_segment(header_b64, "header")?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed(format!(
                "unsupported algorithm {}",
                header.alg
            )));
        }

        let claims: TokenClaims = decode_segment(payload_b64, "payload")?;

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header_json = serde_json::to_vec(&JwtHeader::default())
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        let payload_json =
            serde_json::to_vec(claims).map_err(|e| TokenError::Signing(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(payload_json)
        );

        let mut mac = self.key.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed(format!("invalid {} encoding", what)))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| TokenError::Malformed(format!("invalid {} format", what)))
}

/// Extract Bearer token from Authorization header
///
/// # Returns
/// * `Some(&str)` - The extracted token
/// * `None` - If the header is missing or malformed
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
