//! In-memory store for tests and local runs.
//!
//! Each [`MemoryStore`] is an independent instance; nothing is shared between
//! stores, so tests never observe each other's data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use aceback_core::{DiscId, OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{DiscStore, OrderStore, RepositoryError};
use crate::models::{Disc, StickerOrder};

/// In-memory implementation of [`DiscStore`] and [`OrderStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    discs: Mutex<HashMap<DiscId, Disc>>,
    orders: Mutex<HashMap<OrderId, StickerOrder>>,
    operations: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a disc.
    pub fn insert_disc(&self, disc: Disc) {
        lock(&self.discs).insert(disc.id, disc);
    }

    /// Insert or replace an order.
    pub fn insert_order(&self, order: StickerOrder) {
        lock(&self.orders).insert(order.id, order);
    }

    /// Get a copy of an order by ID.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<StickerOrder> {
        lock(&self.orders).get(&id).cloned()
    }

    /// Number of store operations performed through the store traits.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lock a map, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl DiscStore for MemoryStore {
    async fn find_disc(&self, id: DiscId) -> Result<Option<Disc>, RepositoryError> {
        self.record_operation();
        Ok(lock(&self.discs).get(&id).cloned())
    }

    async fn delete_disc(&self, id: DiscId) -> Result<bool, RepositoryError> {
        self.record_operation();
        Ok(lock(&self.discs).remove(&id).is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<StickerOrder>, RepositoryError> {
        self.record_operation();
        Ok(lock(&self.orders)
            .values()
            .find(|order| order.stripe_checkout_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<StickerOrder>, RepositoryError> {
        self.record_operation();
        let mut orders = lock(&self.orders);
        let Some(order) = orders.get_mut(&id) else {
            return Ok(None);
        };
        if order.status != OrderStatus::PendingPayment {
            return Ok(None);
        }

        order.status = OrderStatus::Paid;
        order.stripe_payment_intent_id = Some(payment_intent_id.to_string());
        order.updated_at = paid_at;
        Ok(Some(order.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aceback_core::{AddressId, Cents, UserId};

    use super::*;

    fn pending_order(session_id: &str) -> StickerOrder {
        let now = Utc::now();
        StickerOrder {
            id: OrderId::new_v4(),
            user_id: UserId::new_v4(),
            shipping_address_id: AddressId::new_v4(),
            quantity: 10,
            unit_price_cents: Cents::new(100),
            total_price_cents: Cents::new(1000),
            status: OrderStatus::PendingPayment,
            stripe_checkout_session_id: Some(session_id.to_string()),
            stripe_payment_intent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let store = MemoryStore::new();
        let order = pending_order("cs_test_1");
        store.insert_order(order.clone());

        let first = store.mark_paid(order.id, "pi_1", Utc::now()).await.unwrap();
        assert_eq!(first.unwrap().status, OrderStatus::Paid);

        let second = store.mark_paid(order.id, "pi_2", Utc::now()).await.unwrap();
        assert!(second.is_none());
        assert_eq!(
            store.order(order.id).unwrap().stripe_payment_intent_id.as_deref(),
            Some("pi_1")
        );
    }

    #[tokio::test]
    async fn test_find_by_checkout_session() {
        let store = MemoryStore::new();
        let order = pending_order("cs_test_2");
        store.insert_order(order.clone());

        let found = store.find_by_checkout_session("cs_test_2").await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(order.id));
        assert!(store.find_by_checkout_session("cs_other").await.unwrap().is_none());
        assert_eq!(store.operation_count(), 2);
    }
}
