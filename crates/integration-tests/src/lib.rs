//! Integration test harness for AceBack functions.
//!
//! Drives the full axum router in-process with `tower::ServiceExt::oneshot`,
//! backed by an in-memory store. No database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aceback-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use aceback_core::{AddressId, Cents, DiscId, OrderId, OrderStatus, UserId};
use aceback_functions::db::memory::MemoryStore;
use aceback_functions::models::{Disc, StickerOrder};
use aceback_functions::routes;
use aceback_functions::services::JwtVerifier;
use aceback_functions::services::auth::{AUTHENTICATED_AUDIENCE, Claims};
use aceback_functions::services::stripe::{CHECKOUT_SESSION_COMPLETED, SignatureVerifier, fixtures};
use aceback_functions::state::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

/// JWT signing secret used by the test router.
pub const JWT_SECRET: &str = "integration-test-jwt-secret-0123456789abcdef";

/// Stripe webhook secret used by the test router.
pub const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

/// Path of the delete function.
pub const DELETE_DISC_PATH: &str = "/functions/v1/delete-disc";

/// Path of the webhook function.
pub const STRIPE_WEBHOOK_PATH: &str = "/functions/v1/stripe-webhook";

/// A router wired to an in-memory store.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub router: Router,
    pub webhook: SignatureVerifier,
}

impl TestContext {
    /// Build a context with a webhook secret configured.
    #[must_use]
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Build a context without a webhook secret.
    #[must_use]
    pub fn without_webhook_secret() -> Self {
        Self::build(false)
    }

    fn build(with_webhook: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let webhook = SignatureVerifier::new(SecretString::from(WEBHOOK_SECRET), 300);

        let state = AppState::new(
            store.clone(),
            store.clone(),
            JwtVerifier::new(&SecretString::from(JWT_SECRET)),
            with_webhook.then(|| webhook.clone()),
        );

        Self {
            store,
            router: routes::router(state),
            webhook,
        }
    }

    /// Send a request through the router and decode the JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Build a signed webhook request for `payload`.
    #[must_use]
    pub fn signed_webhook(&self, payload: &str) -> Request<Body> {
        let header = self
            .webhook
            .header_for(chrono::Utc::now().timestamp(), payload.as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(STRIPE_WEBHOOK_PATH)
            .header("stripe-signature", header)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint a bearer token for `user_id`.
#[must_use]
pub fn bearer_token(user_id: UserId) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        aud: AUTHENTICATED_AUDIENCE.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        email: Some("thrower@example.com".to_string()),
        role: Some("authenticated".to_string()),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

/// Build a delete-disc request.
#[must_use]
pub fn delete_disc_request(method: Method, auth: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(DELETE_DISC_PATH)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A disc owned by `owner_id`.
#[must_use]
pub fn disc(owner_id: UserId) -> Disc {
    Disc {
        id: DiscId::new_v4(),
        owner_id,
        mold: "Destroyer".to_string(),
        name: Some("Backup driver".to_string()),
        created_at: chrono::Utc::now(),
    }
}

/// A sticker order for `session_id` in `status`.
#[must_use]
pub fn sticker_order(session_id: &str, status: OrderStatus) -> StickerOrder {
    let now = chrono::Utc::now();
    StickerOrder {
        id: OrderId::new_v4(),
        user_id: UserId::new_v4(),
        shipping_address_id: AddressId::new_v4(),
        quantity: 10,
        unit_price_cents: Cents::new(100),
        total_price_cents: Cents::new(1000),
        status,
        stripe_checkout_session_id: Some(session_id.to_string()),
        stripe_payment_intent_id: status.is_paid().then(|| "pi_existing".to_string()),
        created_at: now,
        updated_at: now,
    }
}

/// A `checkout.session.completed` event body.
#[must_use]
pub fn checkout_completed(
    session_id: &str,
    payment_intent: Option<&str>,
    order_id: Option<OrderId>,
) -> String {
    let metadata = order_id.map_or_else(
        || serde_json::json!({}),
        |id| serde_json::json!({ "order_id": id.to_string() }),
    );
    fixtures::event(
        &format!("evt_{}", uuid::Uuid::new_v4().simple()),
        CHECKOUT_SESSION_COMPLETED,
        &fixtures::checkout_session(session_id, payment_intent, &metadata),
    )
}

/// An event body of a type the webhook does not act on.
#[must_use]
pub fn unhandled_event(event_type: &str) -> String {
    fixtures::event(
        "evt_unhandled",
        event_type,
        &fixtures::checkout_session("cs_unhandled", None, &serde_json::json!({})),
    )
}
