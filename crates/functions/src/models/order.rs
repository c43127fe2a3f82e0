//! Sticker order model.

use aceback_core::{AddressId, Cents, OrderId, OrderStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An order for AceBack return-address stickers.
///
/// `stripe_payment_intent_id` stays `None` until the order is paid and is
/// written in the same update that sets `status` to `paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StickerOrder {
    /// Unique order ID.
    pub id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// Where the stickers ship to.
    pub shipping_address_id: AddressId,
    /// Number of sticker sheets.
    pub quantity: i32,
    /// Price per sheet.
    pub unit_price_cents: Cents,
    /// Total charged.
    pub total_price_cents: Cents,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Stripe Checkout Session that collects payment.
    pub stripe_checkout_session_id: Option<String>,
    /// Stripe Payment Intent that confirmed payment.
    pub stripe_payment_intent_id: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}
