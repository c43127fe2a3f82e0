//! Functions configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SUPABASE_JWT_SECRET` - Secret used to verify bearer access tokens (min 32 chars)
//!
//! ## Optional
//! - `FUNCTIONS_HOST` - Bind address (default: 127.0.0.1)
//! - `FUNCTIONS_PORT` - Listen port (default: 8000)
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret (`whsec_...`)
//! - `STRIPE_WEBHOOK_TOLERANCE_SECS` - Accepted signature age, 0 to 300 (default: 300)
//! - `RESEND_API_KEY` - Resend API key; email is disabled when absent
//! - `RESEND_BASE_URL` - Resend API base URL (default: <https://api.resend.com>)
//! - `EMAIL_FROM` - Default sender (default: `AceBack <noreply@aceback.app>`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::stripe::MAX_TOLERANCE_SECS;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default sender used when a message does not override `from`.
pub const DEFAULT_EMAIL_FROM: &str = "AceBack <noreply@aceback.app>";

/// Default Resend API base URL.
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

/// Default Stripe signature tolerance, matching Stripe's own libraries.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = MAX_TOLERANCE_SECS;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Functions application configuration.
#[derive(Debug, Clone)]
pub struct FunctionsConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Secret used to verify platform-issued access tokens
    pub jwt_secret: SecretString,
    /// Stripe webhook configuration
    pub stripe: StripeConfig,
    /// Transactional email configuration
    pub email: EmailConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced in Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Stripe webhook configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Webhook signing secret; the webhook function refuses events without it
    pub webhook_secret: Option<SecretString>,
    /// Maximum accepted age of a signature timestamp, in seconds
    pub tolerance_secs: i64,
}

/// Resend email configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct EmailConfig {
    /// Resend API key; `None` means email is not configured
    pub api_key: Option<SecretString>,
    /// Resend API base URL
    pub base_url: String,
    /// Sender used when a message does not provide one
    pub default_from: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("default_from", &self.default_from)
            .finish()
    }
}

impl FunctionsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (length, placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("FUNCTIONS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FUNCTIONS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("FUNCTIONS_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("FUNCTIONS_PORT".to_string(), e.to_string()))?;
        let jwt_secret = get_required_secret("SUPABASE_JWT_SECRET")?;
        validate_min_length(&jwt_secret, "SUPABASE_JWT_SECRET")?;

        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            stripe: StripeConfig::from_env()?,
            email: EmailConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let webhook_secret = match get_optional_env("STRIPE_WEBHOOK_SECRET") {
            Some(value) => {
                validate_secret_strength(&value, "STRIPE_WEBHOOK_SECRET")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        let tolerance_secs = parse_tolerance(&get_env_or_default(
            "STRIPE_WEBHOOK_TOLERANCE_SECS",
            &DEFAULT_WEBHOOK_TOLERANCE_SECS.to_string(),
        ))?;

        Ok(Self {
            webhook_secret,
            tolerance_secs,
        })
    }
}

/// Parse a signature tolerance in seconds, bounded by what the `stripe`
/// crate accepts.
fn parse_tolerance(value: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("STRIPE_WEBHOOK_TOLERANCE_SECS".to_string(), reason)
    };

    let secs = value.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
    if !(0..=MAX_TOLERANCE_SECS).contains(&secs) {
        return Err(invalid(format!(
            "must be between 0 and {MAX_TOLERANCE_SECS}, got {secs}"
        )));
    }
    Ok(secs)
}

impl EmailConfig {
    /// Load email configuration from environment variables.
    ///
    /// Never fails: a missing API key is reported when sending, not at startup.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            api_key: get_optional_env("RESEND_API_KEY")
                .filter(|key| !key.is_empty())
                .map(SecretString::from),
            base_url: get_env_or_default("RESEND_BASE_URL", DEFAULT_RESEND_BASE_URL),
            default_from: get_env_or_default("EMAIL_FROM", DEFAULT_EMAIL_FROM),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate = get_env_or_default(key, default)
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Validate that a secret meets minimum length requirements.
fn validate_min_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret shown in the Stripe dashboard."
            ),
        ));
    }

    Ok(())
}
