//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`,
//! and every error is rendered as a JSON body `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the functions service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// No valid bearer token was attached to the request.
    #[error("Unauthorized")]
    Unauthenticated,

    /// The route does not accept the request method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is authenticated but may not touch the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Webhook signature did not verify.
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// A deployment-time setting is missing.
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) | Self::SignatureInvalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message sent to the client.
    ///
    /// Internal error details are never exposed.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            Self::Unauthenticated | Self::MethodNotAllowed => self.to_string(),
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::SignatureInvalid(msg)
            | Self::NotConfigured(msg) => msg.clone(),
            Self::Forbidden(msg) => format!("Forbidden: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::NotConfigured(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.client_message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Disc not found".to_string());
        assert_eq!(err.to_string(), "Not found: Disc not found");

        let err = AppError::BadRequest("disc_id is required".to_string());
        assert_eq!(err.to_string(), "Bad request: disc_id is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::SignatureInvalid("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(RepositoryError::Database(sqlx::Error::PoolTimedOut).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::NotConfigured("Webhook not configured".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_messages() {
        assert_eq!(
            AppError::Forbidden("You do not own this disc".to_string()).client_message(),
            "Forbidden: You do not own this disc"
        );
        assert_eq!(AppError::Unauthenticated.client_message(), "Unauthorized");
        assert_eq!(
            AppError::MethodNotAllowed.client_message(),
            "Method not allowed"
        );
        assert_eq!(
            AppError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut)).client_message(),
            "Internal server error"
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = AppError::NotFound("Disc not found".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Disc not found");
    }
}
