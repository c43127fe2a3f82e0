//! Stripe webhook support: signature verification and the event model.

pub mod event;
#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;
pub mod signature;

pub use event::{CHECKOUT_SESSION_COMPLETED, CheckoutSession, EventError, StripeEvent};
pub use signature::{MAX_TOLERANCE_SECS, SignatureError, SignatureVerifier};
