use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::ItemRow;
use crate::schemas::item::ItemFields;

pub(crate) const COLUMNS: &str = "id, doc";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {COLUMNS}
         FROM items
         ORDER BY seq"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {COLUMNS}
         FROM items
         WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: Uuid,
    doc: &ItemFields,
) -> Result<ItemRow, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        "INSERT INTO items (id, doc)
         VALUES ($1, $2)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(Json(doc))
    .fetch_one(pool)
    .await
}

/// Shallow merge: top-level keys in `doc` replace the stored ones, the rest stay.
pub(crate) async fn merge(
    pool: &PgPool,
    id: Uuid,
    doc: &ItemFields,
) -> Result<Option<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        "UPDATE items
         SET doc = doc || $2, updated_at = now()
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(Json(doc))
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(&format!(
        "DELETE FROM items
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Health check; also fails when the items table is missing.
pub(crate) async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1 FROM items LIMIT 1").execute(pool).await?;
    Ok(())
}
