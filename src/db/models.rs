use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::schemas::item::{Item, ItemFields};

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ItemRow {
    pub(crate) id: Uuid,
    pub(crate) doc: Json<ItemFields>,
}

impl ItemRow {
    pub(crate) fn into_item(self) -> Item {
        Item { id: self.id.to_string(), fields: self.doc.0 }
    }
}
