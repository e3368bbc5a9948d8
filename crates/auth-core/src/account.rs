//! Account records and identifier handling

use chrono::{DateTime, Utc};
use std::fmt;

use crate::reset::PendingReset;

/// Account record held by a [`CredentialStore`](crate::store::CredentialStore)
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Assigned by the store on first save
    pub id: Option<String>,
    /// Normalized email address, unique across the store
    pub identifier: String,
    /// Argon2 PHC string, never the plaintext secret
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    /// Set while a password reset code is outstanding
    pub pending_reset: Option<PendingReset>,
}

impl AccountRecord {
    /// Create an unsaved record for a freshly hashed secret
    pub fn new(identifier: impl Into<String>, secret_hash: impl Into<String>) -> Self {
        Self {
            id: None,
            identifier: identifier.into(),
            secret_hash: secret_hash.into(),
            created_at: Utc::now(),
            pending_reset: None,
        }
    }

    /// Whether the store has assigned an id
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("secret_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("pending_reset", &self.pending_reset)
            .finish()
    }
}

/// Normalize an identifier to its store key form
///
/// Emails compare case-insensitively and surrounding whitespace is dropped.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Validate email format (basic validation)
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = normalize_identifier(email);

    if email.len() < 5 {
        return Err("Email is too short".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err("Email must contain exactly one @".to_string());
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err("Email local part cannot be empty".to_string());
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Email domain must contain a dot".to_string());
    }

    if email.chars().any(char::is_whitespace) {
        return Err("Email cannot contain whitespace".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  A@X.com "), "a@x.com");
        assert_eq!(normalize_identifier("a@x.com"), "a@x.com");
        // Only ASCII letters are folded
        assert_eq!(normalize_identifier("ÜSER@X.COM"), "Üser@x.com");
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email(" User.Name@Example.co.uk ").is_ok());

        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let record = AccountRecord::new("a@x.com", "$argon2id$v=19$secret");
        let debug = format!("{:?}", record);
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("argon2id"));
        assert!(!record.is_persisted());
    }
}
