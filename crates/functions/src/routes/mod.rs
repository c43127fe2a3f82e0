//! HTTP route handlers for the functions.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//! DELETE /functions/v1/delete-disc      - Delete a disc owned by the caller
//! POST   /functions/v1/stripe-webhook   - Stripe webhook receiver
//! ```
//!
//! Any other method on a function path is answered with
//! `405 {"error": "Method not allowed"}` before authentication runs.

pub mod discs;
pub mod stripe_webhook;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the router for all functions.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/functions/v1/delete-disc",
            delete(discs::delete_disc).fallback(method_not_allowed),
        )
        .route(
            "/functions/v1/stripe-webhook",
            post(stripe_webhook::stripe_webhook).fallback(method_not_allowed),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "function",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::services::JwtVerifier;

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            store.clone(),
            store,
            JwtVerifier::new(&SecretString::from("router-test-secret-at-least-32-characters")),
            None,
        );
        router(state)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn test_wrong_method_is_json_405() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/functions/v1/stripe-webhook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Method not allowed");
    }
}
