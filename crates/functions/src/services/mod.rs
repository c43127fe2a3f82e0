//! Business logic services for the functions.
//!
//! # Services
//!
//! - `auth` - Bearer access token verification
//! - `email` - Transactional email through Resend
//! - `reconcile` - Order state reconciliation from Stripe events
//! - `stripe` - Stripe webhook signatures and event model

pub mod auth;
pub mod email;
pub mod reconcile;
pub mod stripe;

pub use auth::{AuthError, AuthUser, JwtVerifier};
pub use email::{EmailError, EmailService, Recipients, SendEmail, SendEmailResult};
pub use reconcile::{ProcessingError, ReconcileOutcome, reconcile};
