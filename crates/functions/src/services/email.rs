//! Transactional email through the Resend API.
//!
//! Each send is a single best-effort `POST /emails`. Failures are reported
//! to the caller and never retried here.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::EmailConfig;

/// Message reported when the provider gives no reason for a failure.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send email";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// No provider API key is configured.
    #[error("Email not configured")]
    NotConfigured,

    /// The provider rejected the request or could not be reached.
    #[error("{0}")]
    Provider(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// One address or a list of addresses.
///
/// Accepts either JSON form: `"a@example.com"` or `["a@example.com", ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address.
    One(String),
    /// A list of addresses.
    Many(Vec<String>),
}

impl Recipients {
    /// The recipients as a list; a single address becomes a one-element list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(address) => vec![address.clone()],
            Self::Many(addresses) => addresses.clone(),
        }
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self::One(address.to_string())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

/// An email to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmail {
    pub to: Recipients,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Sender; the configured default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Provider-issued message ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniform result of a send: `{success, messageId?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<MessageId, EmailError>> for SendEmailResult {
    fn from(result: Result<MessageId, EmailError>) -> Self {
        match result {
            Ok(id) => Self {
                success: true,
                message_id: Some(id.0),
                error: None,
            },
            Err(e) => Self {
                success: false,
                message_id: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: Vec<String>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ResendErrorBody {
    message: Option<String>,
}

/// Resend API client.
#[derive(Clone)]
pub struct EmailService {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    default_from: String,
}

impl EmailService {
    /// Create a client from email configuration.
    ///
    /// A missing API key is accepted here and reported on each send.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Client` if the HTTP client fails to build.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aceback-functions/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_from: config.default_from.clone(),
        })
    }

    /// Send an email.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::NotConfigured` without any network call when no
    /// API key is set, and `EmailError::Provider` when the request fails or
    /// is rejected.
    pub async fn send(&self, email: &SendEmail) -> Result<MessageId, EmailError> {
        let api_key = self.api_key.as_ref().ok_or(EmailError::NotConfigured)?;

        let body = ResendRequest {
            from: email.from.as_deref().unwrap_or(&self.default_from),
            to: email.to.to_vec(),
            subject: &email.subject,
            html: &email.html,
            text: email.text.as_deref(),
            reply_to: email.reply_to.as_deref(),
        };
        let recipients = body.to.len();

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Email request failed");
                EmailError::Provider(SEND_FAILED_MESSAGE.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ResendErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| SEND_FAILED_MESSAGE.to_string());
            warn!(status = status.as_u16(), message = %message, "Resend rejected email");
            return Err(EmailError::Provider(message));
        }

        let sent: ResendResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Unreadable Resend response");
            EmailError::Provider(SEND_FAILED_MESSAGE.to_string())
        })?;

        info!(message_id = %sent.id, recipients, "Email sent");
        Ok(MessageId(sent.id))
    }

    /// Send an email and fold the outcome into a [`SendEmailResult`].
    pub async fn relay(&self, email: &SendEmail) -> SendEmailResult {
        self.send(email).await.into()
    }
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("default_from", &self.default_from)
            .finish_non_exhaustive()
    }
}
