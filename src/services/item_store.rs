use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repositories;
use crate::schemas::item::{Item, ItemPayload};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("invalid item id \"{0}\"")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Document store holding the item collection.
///
/// Absent records are `Ok(None)`, never an error.
#[async_trait]
pub(crate) trait ItemStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Item>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, StoreError>;

    async fn create(&self, payload: ItemPayload) -> Result<Item, StoreError>;

    /// Merges `payload` into the record and returns the post-update record.
    async fn find_by_id_and_update(
        &self,
        id: &str,
        payload: ItemPayload,
    ) -> Result<Option<Item>, StoreError>;

    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Item>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub(crate) fn parse_item_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id.trim()).map_err(|_| StoreError::InvalidId(id.to_string()))
}

#[derive(Debug, Clone)]
pub(crate) struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn find_all(&self) -> Result<Vec<Item>, StoreError> {
        let rows = repositories::items::list(&self.pool).await?;
        Ok(rows.into_iter().map(|row| row.into_item()).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let id = parse_item_id(id)?;
        let row = repositories::items::find_by_id(&self.pool, id).await?;
        Ok(row.map(|row| row.into_item()))
    }

    async fn create(&self, payload: ItemPayload) -> Result<Item, StoreError> {
        let fields = payload.into_fields();
        let row = repositories::items::create(&self.pool, Uuid::new_v4(), &fields).await?;
        Ok(row.into_item())
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        payload: ItemPayload,
    ) -> Result<Option<Item>, StoreError> {
        let id = parse_item_id(id)?;
        let row = repositories::items::merge(&self.pool, id, payload.fields()).await?;
        Ok(row.map(|row| row.into_item()))
    }

    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let id = parse_item_id(id)?;
        let row = repositories::items::delete(&self.pool, id).await?;
        Ok(row.map(|row| row.into_item()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        repositories::items::ping(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_item_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_item_id(&id.to_string()).expect("valid id"), id);
    }

    #[test]
    fn parse_item_id_rejects_garbage() {
        let err = parse_item_id("not-an-id").expect_err("invalid id");
        assert!(matches!(err, StoreError::InvalidId(ref value) if value == "not-an-id"));
        assert_eq!(err.to_string(), "invalid item id \"not-an-id\"");
    }
}
