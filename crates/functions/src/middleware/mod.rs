//! HTTP middleware and extractors for the functions.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlation across logs, Sentry and the response)
//!
//! Authentication is an extractor rather than a layer: only the handlers
//! that take [`RequireAuth`] are protected.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
