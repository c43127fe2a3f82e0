//! Disc repository backed by `PostgreSQL`.

use aceback_core::DiscId;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{DiscStore, RepositoryError};
use crate::models::Disc;

/// `PostgreSQL` implementation of [`DiscStore`].
#[derive(Clone)]
pub struct PgDiscStore {
    pool: PgPool,
}

impl PgDiscStore {
    /// Create a new disc repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscStore for PgDiscStore {
    async fn find_disc(&self, id: DiscId) -> Result<Option<Disc>, RepositoryError> {
        let disc = sqlx::query_as::<_, Disc>(
            r"
            SELECT id, owner_id, mold, name, created_at
            FROM discs
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(disc)
    }

    async fn delete_disc(&self, id: DiscId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM discs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aceback_core::UserId;

    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_then_delete(pool: PgPool) {
        let owner_id = UserId::new_v4();
        let id: DiscId = sqlx::query_scalar(
            "INSERT INTO discs (owner_id, mold, name) VALUES ($1, 'Buzzz', NULL) RETURNING id",
        )
        .bind(owner_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        let store = PgDiscStore::new(pool);

        let disc = store.find_disc(id).await.unwrap().unwrap();
        assert_eq!(disc.owner_id, owner_id);
        assert_eq!(disc.mold, "Buzzz");
        assert!(disc.name.is_none());

        assert!(store.delete_disc(id).await.unwrap());
        assert!(!store.delete_disc(id).await.unwrap());
        assert!(store.find_disc(id).await.unwrap().is_none());
    }
}
