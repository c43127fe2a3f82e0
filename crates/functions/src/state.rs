//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::FunctionsConfig;
use crate::db::{DiscStore, OrderStore, PgDiscStore, PgOrderStore};
use crate::services::JwtVerifier;
use crate::services::stripe::SignatureVerifier;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Stores are explicit instances
/// so each handler can be driven against Postgres or an in-memory store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    discs: Arc<dyn DiscStore>,
    orders: Arc<dyn OrderStore>,
    jwt: JwtVerifier,
    webhook: Option<SignatureVerifier>,
}

impl AppState {
    /// Create application state from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `discs` - Disc store used by the delete function
    /// * `orders` - Order store used by the webhook reconciler
    /// * `jwt` - Bearer token verifier
    /// * `webhook` - Stripe signature verifier, `None` when no secret is set
    #[must_use]
    pub fn new(
        discs: Arc<dyn DiscStore>,
        orders: Arc<dyn OrderStore>,
        jwt: JwtVerifier,
        webhook: Option<SignatureVerifier>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                discs,
                orders,
                jwt,
                webhook,
            }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(config: &FunctionsConfig, pool: PgPool) -> Self {
        let webhook = config
            .stripe
            .webhook_secret
            .clone()
            .map(|secret| SignatureVerifier::new(secret, config.stripe.tolerance_secs));

        Self::new(
            Arc::new(PgDiscStore::new(pool.clone())),
            Arc::new(PgOrderStore::new(pool)),
            JwtVerifier::new(&config.jwt_secret),
            webhook,
        )
    }

    /// Get a reference to the disc store.
    #[must_use]
    pub fn discs(&self) -> &dyn DiscStore {
        self.inner.discs.as_ref()
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Get a reference to the bearer token verifier.
    #[must_use]
    pub fn jwt(&self) -> &JwtVerifier {
        &self.inner.jwt
    }

    /// Get the Stripe signature verifier, if a webhook secret is configured.
    #[must_use]
    pub fn webhook(&self) -> Option<&SignatureVerifier> {
        self.inner.webhook.as_ref()
    }
}
