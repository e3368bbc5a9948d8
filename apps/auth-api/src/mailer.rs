//! Delivery of password reset codes
//!
//! `ResendMailer` posts to the Resend HTTP API. `LogMailer` only writes to
//! the log and is used when no API key is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resend API endpoint
const RESEND_API_URL: &str = "https://api.resend.com/emails";

const RESET_SUBJECT: &str = "Your password reset code";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Sends reset codes to account holders
#[async_trait]
pub trait ResetMailer: Send + Sync {
    async fn send_reset_code(&self, to: &str, code: &str) -> Result<(), MailError>;
}

/// Plain-text body of the reset email
pub fn reset_body(code: &str, ttl_minutes: u64) -> String {
    format!(
        "Your password reset code is: {}\n\n\
         The code expires in {} minutes.\n\n\
         If you didn't request a password reset, you can ignore this email. \
         Your password will remain unchanged.",
        code, ttl_minutes
    )
}

/// Resend API request payload
#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Resend API success response
#[derive(Debug, Deserialize)]
struct ResendSuccessResponse {
    id: String,
}

/// Resend API error response
#[derive(Debug, Deserialize)]
struct ResendErrorResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from_address: String,
    ttl_minutes: u64,
}

impl ResendMailer {
    pub fn new(api_key: String, from_address: String, ttl_minutes: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from_address,
            ttl_minutes,
        }
    }
}

#[async_trait]
impl ResetMailer for ResendMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let text = reset_body(code, self.ttl_minutes);
        let payload = ResendPayload {
            from: &self.from_address,
            to: [to],
            subject: RESET_SUBJECT,
            text: &text,
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            match response.json::<ResendSuccessResponse>().await {
                Ok(success) => tracing::info!("Reset email sent to {}: id={}", to, success.id),
                // Accepted by the provider even if the body is unexpected
                Err(e) => tracing::warn!("Resend response parse error: {}", e),
            }
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Resend error ({}): {}", status, error_text);

        let message = serde_json::from_str::<ResendErrorResponse>(&error_text)
            .ok()
            .and_then(|err| err.message.or(err.name))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Err(MailError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Development mailer that writes the code to the log
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl ResetMailer for LogMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        tracing::warn!("No mail provider configured; reset code for {} written to debug log", to);
        tracing::debug!("Reset code for {}: {}", to, code);
        Ok(())
    }
}
