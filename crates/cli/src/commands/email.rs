//! Email relay command.
//!
//! # Usage
//!
//! ```bash
//! aceback-cli email send \
//!     --to thrower@example.com \
//!     --subject "Your disc was found" \
//!     --html "<p>Someone found your disc.</p>"
//! ```
//!
//! Prints the send result as JSON (`{success, messageId?, error?}`) and
//! fails when the send did not succeed.
//!
//! # Environment Variables
//!
//! - `RESEND_API_KEY` - Resend API key
//! - `RESEND_BASE_URL` - API base URL (default `https://api.resend.com`)
//! - `EMAIL_FROM` - default sender

use aceback_functions::config::EmailConfig;
use aceback_functions::services::{EmailError, EmailService, Recipients, SendEmail, SendEmailResult};

/// Errors that can occur while relaying email.
#[derive(Debug, thiserror::Error)]
pub enum EmailCommandError {
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Email was not sent: {0}")]
    NotSent(String),
}

/// Arguments for a single send.
#[derive(Debug, Clone)]
pub struct SendArgs {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub from: Option<String>,
    pub reply_to: Option<String>,
}

impl SendArgs {
    fn into_message(self) -> SendEmail {
        let to = match <[String; 1]>::try_from(self.to) {
            Ok([single]) => Recipients::One(single),
            Err(many) => Recipients::Many(many),
        };

        SendEmail {
            to,
            subject: self.subject,
            html: self.html,
            text: self.text,
            from: self.from,
            reply_to: self.reply_to,
        }
    }
}

/// Send one email through the relay and print the result.
///
/// # Errors
///
/// Returns `EmailCommandError` if the client cannot be built or the send
/// did not succeed.
pub async fn send(args: SendArgs) -> Result<(), EmailCommandError> {
    let service = EmailService::new(&EmailConfig::from_env())?;
    let result: SendEmailResult = service.relay(&args.into_message()).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if result.success {
        Ok(())
    } else {
        Err(EmailCommandError::NotSent(
            result.error.unwrap_or_default(),
        ))
    }
}
