//! Configuration for Auth API
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first by `main`). The signing key is the only required value.

use anyhow::{anyhow, Context, Result};
use auth_core::{Argon2Hasher, SigningKey, DEFAULT_RESET_CODE_TTL};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAIL_FROM: &str = "Auth <noreply@localhost>";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub signing_key: SigningKey,
    pub token_ttl: Duration,
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
    /// Report unknown accounts and wrong passwords identically
    pub collapse_login_errors: bool,
    pub reset_code_ttl: Duration,
    pub mail: MailConfig,
}

/// Reset-code delivery settings
#[derive(Clone)]
pub struct MailConfig {
    /// Resend API key; codes are only logged when unset
    pub resend_api_key: Option<String>,
    pub from_address: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - AUTH_SIGNING_KEY: base64 key, at least 32 bytes decoded (required)
    /// - PORT: listen port (default: 3002)
    /// - DATABASE_URL: SQLite URL (default: file in the platform data dir)
    /// - AUTH_TOKEN_TTL_SECS: token lifetime (default: 3600)
    /// - AUTH_ARGON2_M_COST / AUTH_ARGON2_T_COST / AUTH_ARGON2_P_COST
    /// - AUTH_COLLAPSE_LOGIN_ERRORS: "true" or "false" (default: true)
    /// - AUTH_RESET_CODE_TTL_SECS: reset code lifetime (default: 1800)
    /// - RESEND_API_KEY: enables reset emails through Resend (optional)
    /// - AUTH_MAIL_FROM: sender address for reset emails
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signing_key = lookup("AUTH_SIGNING_KEY")
            .ok_or_else(|| anyhow!("AUTH_SIGNING_KEY is not set"))?;
        let signing_key = SigningKey::from_base64(&signing_key)
            .map_err(|e| anyhow!("AUTH_SIGNING_KEY is invalid: {}", e))?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(default_database_url);

        let token_ttl_secs: u64 =
            parse_var(&lookup, "AUTH_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs == 0 {
            return Err(anyhow!("AUTH_TOKEN_TTL_SECS must be greater than zero"));
        }

        let reset_code_ttl_secs: u64 = parse_var(
            &lookup,
            "AUTH_RESET_CODE_TTL_SECS",
            DEFAULT_RESET_CODE_TTL.as_secs(),
        )?;
        if reset_code_ttl_secs == 0 {
            return Err(anyhow!("AUTH_RESET_CODE_TTL_SECS must be greater than zero"));
        }

        let mail = MailConfig {
            resend_api_key: lookup("RESEND_API_KEY").filter(|key| !key.trim().is_empty()),
            from_address: lookup("AUTH_MAIL_FROM")
                .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
        };

        let config = Self {
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            database_url,
            signing_key,
            token_ttl: Duration::from_secs(token_ttl_secs),
            argon2_m_cost: parse_var(
                &lookup,
                "AUTH_ARGON2_M_COST",
                argon2_defaults::DEFAULT_M_COST,
            )?,
            argon2_t_cost: parse_var(
                &lookup,
                "AUTH_ARGON2_T_COST",
                argon2_defaults::DEFAULT_T_COST,
            )?,
            argon2_p_cost: parse_var(
                &lookup,
                "AUTH_ARGON2_P_COST",
                argon2_defaults::DEFAULT_P_COST,
            )?,
            collapse_login_errors: parse_var(&lookup, "AUTH_COLLAPSE_LOGIN_ERRORS", true)?,
            reset_code_ttl: Duration::from_secs(reset_code_ttl_secs),
            mail,
        };

        // Fail at startup rather than on the first registration.
        config.hasher()?;

        Ok(config)
    }

    /// Build the password hasher for the configured cost
    pub fn hasher(&self) -> Result<Argon2Hasher> {
        Argon2Hasher::with_params(self.argon2_m_cost, self.argon2_t_cost, self.argon2_p_cost)
            .map_err(|e| anyhow!("Invalid Argon2 parameters: {}", e))
    }
}

/// Argon2id cost defaults
mod argon2_defaults {
    pub const DEFAULT_M_COST: u32 = 19 * 1024;
    pub const DEFAULT_T_COST: u32 = 2;
    pub const DEFAULT_P_COST: u32 = 1;
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        None => Ok(default),
    }
}

fn default_database_url() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("auth-api");
    std::fs::create_dir_all(&data_dir).ok();
    format!("sqlite:{}/auth.db?mode=rwc", data_dir.display())
}

/// Get platform-specific data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
