//! Stripe event model.
//!
//! Events are constructed by `stripe_webhook` and narrowed to the closed
//! set this service acts on. Anything not listed in [`StripeEvent`] maps to
//! [`StripeEvent::Unhandled`] and is acknowledged without side effects.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Stripe type string for a completed Checkout Session.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Errors that can occur while constructing an event.
#[derive(Debug, Error)]
pub enum EventError {
    /// The body is not valid UTF-8.
    #[error("event payload is not utf-8")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// `stripe_webhook` rejected the delivery.
    #[error("invalid event payload: {0}")]
    InvalidPayload(String),
}

/// A verified Stripe event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEvent {
    /// `checkout.session.completed`
    CheckoutSessionCompleted {
        /// Stripe event ID (`evt_...`).
        event_id: String,
        /// The completed session.
        session: CheckoutSession,
    },
    /// Any event type this service does not act on.
    Unhandled {
        /// Stripe event ID (`evt_...`).
        event_id: String,
        /// Stripe event type string.
        event_type: String,
    },
}

/// The parts of a Checkout Session the reconciler reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Session ID (`cs_...`).
    pub id: String,
    /// Payment Intent that confirmed payment (`pi_...`).
    pub payment_intent: Option<String>,
    /// Metadata attached when the session was created.
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// The order ID recorded in metadata when the session was created.
    #[must_use]
    pub fn metadata_order_id(&self) -> Option<&str> {
        self.metadata.get("order_id").map(String::as_str)
    }
}

impl From<stripe_webhook::Event> for StripeEvent {
    fn from(event: stripe_webhook::Event) -> Self {
        let event_id = event.id.to_string();

        match event.data.object {
            stripe_webhook::EventObject::CheckoutSessionCompleted(session) => {
                Self::CheckoutSessionCompleted {
                    event_id,
                    session: CheckoutSession {
                        id: session.id.to_string(),
                        payment_intent: session
                            .payment_intent
                            .as_ref()
                            .map(|intent| intent.id().to_string()),
                        metadata: session.metadata.unwrap_or_default(),
                    },
                }
            }
            _ => Self::Unhandled {
                event_id,
                event_type: event.type_.to_string(),
            },
        }
    }
}

impl StripeEvent {
    /// Construct an event from a raw delivery with `stripe_webhook`.
    ///
    /// The crate re-checks `signature` against `secret` before decoding the
    /// typed event object.
    ///
    /// # Errors
    ///
    /// Returns `EventError` if the body is not UTF-8 or the crate cannot
    /// construct an event from it.
    pub fn construct(
        payload: &[u8],
        signature: &str,
        secret: &SecretString,
    ) -> Result<Self, EventError> {
        let payload = std::str::from_utf8(payload)?;
        let event =
            stripe_webhook::Webhook::construct_event(payload, signature, secret.expose_secret())
                .map_err(|e| EventError::InvalidPayload(e.to_string()))?;
        Ok(event.into())
    }

    /// Stripe event ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted { event_id, .. } | Self::Unhandled { event_id, .. } => {
                event_id
            }
        }
    }

    /// Stripe event type string.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted { .. } => CHECKOUT_SESSION_COMPLETED,
            Self::Unhandled { event_type, .. } => event_type,
        }
    }
}
