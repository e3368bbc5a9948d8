//! Password reset codes
//!
//! A reset code is six decimal digits drawn from the OS RNG. Only its Argon2
//! hash is stored on the account, next to an expiry, until it is redeemed.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// Digits in a reset code
pub const RESET_CODE_LEN: usize = 6;

/// How long a reset code stays redeemable (30 minutes)
pub const DEFAULT_RESET_CODE_TTL: Duration = Duration::from_secs(30 * 60);

const CODE_SPACE: u32 = 1_000_000;
// Largest multiple of CODE_SPACE that fits in a u32; draws above it are retried
const ACCEPT_BELOW: u32 = u32::MAX - (u32::MAX % CODE_SPACE);

/// Outstanding reset request stored on an account
#[derive(Clone, PartialEq, Eq)]
pub struct PendingReset {
    /// Argon2 PHC string of the code
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingReset {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl fmt::Debug for PendingReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReset")
            .field("code_hash", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Generate a fresh zero-padded reset code
pub fn generate_reset_code() -> Zeroizing<String> {
    let value = loop {
        let draw = OsRng.next_u32();
        if draw < ACCEPT_BELOW {
            break draw % CODE_SPACE;
        }
    };
    Zeroizing::new(format!("{:0width$}", value, width = RESET_CODE_LEN))
}

/// Whether `code` has the shape of a reset code
pub fn is_reset_code(code: &str) -> bool {
    code.len() == RESET_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}
