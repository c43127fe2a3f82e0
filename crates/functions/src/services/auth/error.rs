//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    #[error("missing authorization header")]
    MissingToken,

    /// The header is not of the form `Bearer <token>`.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// The token failed signature, audience, or expiry validation.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The token subject is not a user UUID.
    #[error("invalid token subject: {0}")]
    InvalidSubject(String),
}
