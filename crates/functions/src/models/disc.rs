//! Disc model.

use aceback_core::{DiscId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A disc in a user's bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Disc {
    /// Unique disc ID.
    pub id: DiscId,
    /// User who owns the disc.
    pub owner_id: UserId,
    /// Mold name (e.g. "Destroyer").
    pub mold: String,
    /// Optional nickname given by the owner.
    pub name: Option<String>,
    /// When the disc was created.
    pub created_at: DateTime<Utc>,
}

impl Disc {
    /// Whether `user` owns this disc.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}
