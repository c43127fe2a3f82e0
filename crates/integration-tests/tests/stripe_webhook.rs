//! End-to-end tests for `POST /functions/v1/stripe-webhook`.

#![allow(clippy::unwrap_used)]

use aceback_core::OrderStatus;
use aceback_integration_tests::{
    STRIPE_WEBHOOK_PATH, TestContext, checkout_completed, sticker_order, unhandled_event,
};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

fn unsigned(method: Method, payload: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(STRIPE_WEBHOOK_PATH)
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_wrong_method() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(unsigned(Method::GET, "")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_missing_signature_touches_nothing() {
    let ctx = TestContext::new();
    let order = sticker_order("cs_missing_sig", OrderStatus::PendingPayment);
    ctx.store.insert_order(order.clone());

    let payload = checkout_completed("cs_missing_sig", Some("pi_1"), None);
    let (status, body) = ctx.send(unsigned(Method::POST, &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing stripe-signature header");
    assert_eq!(ctx.store.operation_count(), 0);
    assert_eq!(
        ctx.store.order(order.id).unwrap().status,
        OrderStatus::PendingPayment
    );
}

#[tokio::test]
async fn test_invalid_signature() {
    let ctx = TestContext::new();
    let payload = checkout_completed("cs_bad_sig", Some("pi_1"), None);

    let request = Request::builder()
        .method(Method::POST)
        .uri(STRIPE_WEBHOOK_PATH)
        .header(
            "stripe-signature",
            format!("t={},v1=deadbeef", chrono::Utc::now().timestamp()),
        )
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Webhook signature verification failed");
    assert_eq!(ctx.store.operation_count(), 0);
}

#[tokio::test]
async fn test_tampered_body() {
    let ctx = TestContext::new();
    let payload = checkout_completed("cs_tampered", Some("pi_1"), None);
    let mut request = ctx.signed_webhook(&payload);
    *request.body_mut() = Body::from(checkout_completed("cs_other", Some("pi_2"), None));

    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Webhook signature verification failed");
}

#[tokio::test]
async fn test_secret_not_configured() {
    let ctx = TestContext::without_webhook_secret();
    let payload = checkout_completed("cs_unconfigured", Some("pi_1"), None);

    let (status, body) = ctx.send(ctx.signed_webhook(&payload)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Webhook not configured");
}

#[tokio::test]
async fn test_invalid_event_payload() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(ctx.signed_webhook("{\"hello\":\"world\"}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid event payload");
}

#[tokio::test]
async fn test_pending_order_marked_paid() {
    let ctx = TestContext::new();
    let order = sticker_order("cs_pending", OrderStatus::PendingPayment);
    ctx.store.insert_order(order.clone());

    let payload = checkout_completed("cs_pending", Some("pi_paid"), Some(order.id));
    let (status, body) = ctx.send(ctx.signed_webhook(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));

    let stored = ctx.store.order(order.id).unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.stripe_payment_intent_id.as_deref(), Some("pi_paid"));
}

#[tokio::test]
async fn test_redelivery_is_noop() {
    let ctx = TestContext::new();
    let order = sticker_order("cs_redelivered", OrderStatus::PendingPayment);
    ctx.store.insert_order(order.clone());

    let first = checkout_completed("cs_redelivered", Some("pi_first"), None);
    let (status, _) = ctx.send(ctx.signed_webhook(&first)).await;
    assert_eq!(status, StatusCode::OK);
    let after_first = ctx.store.order(order.id).unwrap();

    let second = checkout_completed("cs_redelivered", Some("pi_second"), None);
    let (status, body) = ctx.send(ctx.signed_webhook(&second)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(ctx.store.order(order.id).unwrap(), after_first);
}

#[tokio::test]
async fn test_paid_order_keeps_payment_intent() {
    let ctx = TestContext::new();
    let order = sticker_order("cs_already_paid", OrderStatus::Paid);
    ctx.store.insert_order(order.clone());

    let payload = checkout_completed("cs_already_paid", Some("pi_new"), None);
    let (status, _) = ctx.send(ctx.signed_webhook(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ctx.store
            .order(order.id)
            .unwrap()
            .stripe_payment_intent_id
            .as_deref(),
        Some("pi_existing")
    );
}

#[tokio::test]
async fn test_unknown_order_still_acknowledged() {
    let ctx = TestContext::new();

    let payload = checkout_completed("cs_nobody", Some("pi_1"), None);
    let (status, body) = ctx.send(ctx.signed_webhook(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn test_cancelled_order_not_paid() {
    let ctx = TestContext::new();
    let order = sticker_order("cs_cancelled", OrderStatus::Cancelled);
    ctx.store.insert_order(order.clone());

    let payload = checkout_completed("cs_cancelled", Some("pi_1"), None);
    let (status, _) = ctx.send(ctx.signed_webhook(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ctx.store.order(order.id).unwrap().status,
        OrderStatus::Cancelled
    );
}

#[tokio::test]
async fn test_unhandled_event_type() {
    let ctx = TestContext::new();
    let payload = unhandled_event("checkout.session.expired");

    let (status, body) = ctx.send(ctx.signed_webhook(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(ctx.store.operation_count(), 0);
}

#[tokio::test]
async fn test_extreme_timestamp_rejected() {
    let ctx = TestContext::new();
    let payload = checkout_completed("cs_extreme", Some("pi_1"), None);

    let request = Request::builder()
        .method(Method::POST)
        .uri(STRIPE_WEBHOOK_PATH)
        .header("stripe-signature", "t=-9223372036854775808,v1=00")
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Webhook signature verification failed");
    assert_eq!(ctx.store.operation_count(), 0);
}
