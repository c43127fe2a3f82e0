//! Order reconciliation from Stripe events.
//!
//! A completed Checkout Session moves its order from `pending_payment` to
//! `paid`. Redelivery of the same event is a no-op. Failures that a retry
//! could never fix (no order for the session, cancelled order) are reported
//! as [`ProcessingError`]s inside the outcome rather than as errors, so the
//! caller can still acknowledge the delivery.

use aceback_core::{OrderId, OrderStatus};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::stripe::{CheckoutSession, StripeEvent};
use crate::db::{OrderStore, RepositoryError};

/// A permanent failure while applying an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// No order was created for the checkout session.
    #[error("no order found for checkout session {session_id}")]
    OrderNotFound {
        /// Checkout Session ID from the event.
        session_id: String,
    },

    /// The completed session carries no payment intent.
    #[error("checkout session {session_id} has no payment_intent")]
    MissingPaymentIntent {
        /// Checkout Session ID from the event.
        session_id: String,
    },

    /// The order is in a status that cannot move to `paid`.
    #[error("order {order_id} is {status} and cannot be marked paid")]
    InvalidTransition {
        /// Order the session points at.
        order_id: OrderId,
        /// Status found on the order.
        status: OrderStatus,
    },
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order moved to `paid`.
    Applied {
        /// Order that was updated.
        order_id: OrderId,
    },
    /// The order was already paid; nothing changed.
    AlreadyApplied {
        /// Order the event refers to.
        order_id: OrderId,
    },
    /// The event type is not acted on.
    Ignored {
        /// Stripe event type string.
        event_type: String,
    },
    /// The event could not be applied and never will be.
    Failed(ProcessingError),
}

/// Apply a verified Stripe event to the order store.
///
/// # Errors
///
/// Returns `RepositoryError` only for store failures, which are transient and
/// worth a redelivery. Permanent problems come back as
/// [`ReconcileOutcome::Failed`].
pub async fn reconcile(
    orders: &dyn OrderStore,
    event: &StripeEvent,
) -> Result<ReconcileOutcome, RepositoryError> {
    match event {
        StripeEvent::CheckoutSessionCompleted { event_id, session } => {
            debug!(event_id = %event_id, session_id = %session.id, "Reconciling checkout session");
            complete_checkout(orders, session).await
        }
        StripeEvent::Unhandled {
            event_id,
            event_type,
        } => {
            debug!(event_id = %event_id, event_type = %event_type, "Ignoring webhook event type");
            Ok(ReconcileOutcome::Ignored {
                event_type: event_type.clone(),
            })
        }
    }
}

async fn complete_checkout(
    orders: &dyn OrderStore,
    session: &CheckoutSession,
) -> Result<ReconcileOutcome, RepositoryError> {
    let Some(order) = orders.find_by_checkout_session(&session.id).await? else {
        return Ok(ReconcileOutcome::Failed(ProcessingError::OrderNotFound {
            session_id: session.id.clone(),
        }));
    };

    // The checkout session is the source of truth for linkage.
    if let Some(metadata_order_id) = session.metadata_order_id()
        && metadata_order_id != order.id.to_string()
    {
        warn!(
            session_id = %session.id,
            order_id = %order.id,
            metadata_order_id = %metadata_order_id,
            "Checkout session metadata names a different order; using session lookup"
        );
    }

    if order.status.is_paid() {
        debug!(order_id = %order.id, status = %order.status, "Order already paid");
        return Ok(ReconcileOutcome::AlreadyApplied { order_id: order.id });
    }

    if !order.status.can_transition_to(OrderStatus::Paid) {
        return Ok(ReconcileOutcome::Failed(ProcessingError::InvalidTransition {
            order_id: order.id,
            status: order.status,
        }));
    }

    let Some(payment_intent) = session.payment_intent.as_deref() else {
        return Ok(ReconcileOutcome::Failed(ProcessingError::MissingPaymentIntent {
            session_id: session.id.clone(),
        }));
    };

    match orders.mark_paid(order.id, payment_intent, Utc::now()).await? {
        Some(updated) => {
            info!(
                order_id = %updated.id,
                payment_intent = %payment_intent,
                total = %updated.total_price_cents,
                "Order marked paid"
            );
            Ok(ReconcileOutcome::Applied { order_id: updated.id })
        }
        // A concurrent delivery won the conditional update.
        None => {
            debug!(order_id = %order.id, "Order was paid by a concurrent delivery");
            Ok(ReconcileOutcome::AlreadyApplied { order_id: order.id })
        }
    }
}
