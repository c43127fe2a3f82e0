//! Stripe webhook receiver.
//!
//! Verifies the delivery, has `stripe_webhook` construct a [`StripeEvent`]
//! from it and hands that to the reconciler. The provider is told `200 {"received": true}` for every
//! verified event, including events that failed permanently; only store
//! failures answer 500 so Stripe redelivers.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::services::reconcile::{ReconcileOutcome, reconcile};
use crate::services::stripe::StripeEvent;
use crate::state::AppState;

/// Header carrying the Stripe signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Result of handling one verified delivery.
///
/// Responds to the provider with an acknowledgement while keeping the
/// internal [`ReconcileOutcome`] for recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOutcome {
    /// Stripe event ID.
    pub event_id: String,
    /// Stripe event type string.
    pub event_type: String,
    /// What reconciliation did.
    pub outcome: ReconcileOutcome,
}

impl WebhookOutcome {
    /// Log the outcome, capturing permanent failures to Sentry.
    pub fn record(&self) {
        match &self.outcome {
            ReconcileOutcome::Applied { order_id } => {
                tracing::info!(
                    event_id = %self.event_id,
                    order_id = %order_id,
                    "Webhook applied"
                );
            }
            ReconcileOutcome::AlreadyApplied { order_id } => {
                tracing::info!(
                    event_id = %self.event_id,
                    order_id = %order_id,
                    "Webhook already applied"
                );
            }
            ReconcileOutcome::Ignored { event_type } => {
                tracing::debug!(
                    event_id = %self.event_id,
                    event_type = %event_type,
                    "Webhook ignored"
                );
            }
            ReconcileOutcome::Failed(error) => {
                let sentry_event_id = sentry::with_scope(
                    |scope| {
                        scope.set_tag("stripe_event_id", &self.event_id);
                        scope.set_tag("stripe_event_type", &self.event_type);
                    },
                    || sentry::capture_error(error),
                );
                tracing::error!(
                    event_id = %self.event_id,
                    event_type = %self.event_type,
                    error = %error,
                    sentry_event_id = %sentry_event_id,
                    "Webhook processing failed"
                );
            }
        }
    }
}

impl IntoResponse for WebhookOutcome {
    fn into_response(self) -> Response {
        Json(json!({ "received": true })).into_response()
    }
}

/// Receive a Stripe webhook delivery.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WebhookOutcome> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature header".to_string()))?;

    let verifier = state
        .webhook()
        .ok_or_else(|| AppError::NotConfigured("Webhook not configured".to_string()))?;

    verifier.verify(&body, signature).map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        AppError::SignatureInvalid("Webhook signature verification failed".to_string())
    })?;

    let event = StripeEvent::construct(&body, signature, verifier.secret()).map_err(|e| {
        tracing::warn!(error = %e, "Invalid webhook event payload");
        AppError::BadRequest("Invalid event payload".to_string())
    })?;

    tracing::debug!(event_id = %event.id(), event_type = %event.event_type(), "Webhook received");

    let outcome = WebhookOutcome {
        event_id: event.id().to_string(),
        event_type: event.event_type().to_string(),
        outcome: reconcile(state.orders(), &event).await?,
    };
    outcome.record();

    Ok(outcome)
}
