//! Sticker order repository backed by `PostgreSQL`.

use aceback_core::{OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{OrderStore, RepositoryError};
use crate::models::StickerOrder;

/// `PostgreSQL` implementation of [`OrderStore`].
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<StickerOrder>, RepositoryError> {
        let order = sqlx::query_as::<_, StickerOrder>(
            r"
            SELECT id, user_id, shipping_address_id, quantity,
                   unit_price_cents, total_price_cents, status,
                   stripe_checkout_session_id, stripe_payment_intent_id,
                   created_at, updated_at
            FROM sticker_orders
            WHERE stripe_checkout_session_id = $1
            ",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<StickerOrder>, RepositoryError> {
        // The status guard makes the transition row-atomic: a concurrent
        // redelivery that loses the race updates nothing.
        let order = sqlx::query_as::<_, StickerOrder>(
            r"
            UPDATE sticker_orders
            SET status = $2,
                stripe_payment_intent_id = $3,
                updated_at = $4
            WHERE id = $1 AND status = $5
            RETURNING id, user_id, shipping_address_id, quantity,
                      unit_price_cents, total_price_cents, status,
                      stripe_checkout_session_id, stripe_payment_intent_id,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(OrderStatus::Paid)
        .bind(payment_intent_id)
        .bind(paid_at)
        .bind(OrderStatus::PendingPayment)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aceback_core::{AddressId, UserId};

    use super::*;

    async fn insert_order(pool: &PgPool, session_id: &str, status: OrderStatus) -> OrderId {
        let user_id = UserId::new_v4();
        let address_id: AddressId = sqlx::query_scalar(
            r"
            INSERT INTO shipping_addresses (user_id, name, street_address, city, state, postal_code)
            VALUES ($1, 'Test Thrower', '1 Fairway Dr', 'Emporia', 'KS', '66801')
            RETURNING id
            ",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let payment_intent = (status == OrderStatus::Paid).then_some("pi_existing");

        sqlx::query_scalar(
            r"
            INSERT INTO sticker_orders (
                user_id, shipping_address_id, quantity, unit_price_cents, total_price_cents,
                status, stripe_checkout_session_id, stripe_payment_intent_id
            )
            VALUES ($1, $2, 10, 100, 1000, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(address_id)
        .bind(status)
        .bind(session_id)
        .bind(payment_intent)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_by_checkout_session(pool: PgPool) {
        let id = insert_order(&pool, "cs_find", OrderStatus::PendingPayment).await;
        let store = PgOrderStore::new(pool);

        let order = store.find_by_checkout_session("cs_find").await.unwrap().unwrap();
        assert_eq!(order.id, id);
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert_eq!(order.quantity, 10);
        assert!(order.stripe_payment_intent_id.is_none());

        assert!(store.find_by_checkout_session("cs_other").await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_mark_paid_applies_once(pool: PgPool) {
        let id = insert_order(&pool, "cs_twice", OrderStatus::PendingPayment).await;
        let store = PgOrderStore::new(pool);

        let paid = store.mark_paid(id, "pi_first", Utc::now()).await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.stripe_payment_intent_id.as_deref(), Some("pi_first"));

        assert!(store.mark_paid(id, "pi_second", Utc::now()).await.unwrap().is_none());

        let stored = store.find_by_checkout_session("cs_twice").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
        assert_eq!(stored.stripe_payment_intent_id.as_deref(), Some("pi_first"));
        assert_eq!(stored.updated_at, paid.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_mark_paid_skips_cancelled(pool: PgPool) {
        let id = insert_order(&pool, "cs_cancelled", OrderStatus::Cancelled).await;
        let store = PgOrderStore::new(pool);

        assert!(store.mark_paid(id, "pi_late", Utc::now()).await.unwrap().is_none());

        let stored = store.find_by_checkout_session("cs_cancelled").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert!(stored.stripe_payment_intent_id.is_none());
    }
}
