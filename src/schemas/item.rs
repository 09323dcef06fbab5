use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client-supplied item attributes. The shape is open; nothing is validated.
pub(crate) type ItemFields = Map<String, Value>;

pub(crate) const ID_FIELD: &str = "_id";
pub(crate) const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Item {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(flatten)]
    pub(crate) fields: ItemFields,
}

/// Write payload for create and update. The store-assigned `_id` is never
/// taken from the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ItemPayload {
    fields: ItemFields,
}

impl ItemPayload {
    pub(crate) fn from_fields(mut fields: ItemFields) -> Self {
        fields.remove(ID_FIELD);
        Self { fields }
    }

    /// Replaces any `image` value with a single-element list holding `url`.
    pub(crate) fn attach_image(&mut self, url: String) {
        self.fields.insert(IMAGE_FIELD.to_string(), Value::Array(vec![Value::String(url)]));
    }

    pub(crate) fn fields(&self) -> &ItemFields {
        &self.fields
    }

    pub(crate) fn into_fields(self) -> ItemFields {
        self.fields
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteItemResponse {
    pub(crate) message: &'static str,
    #[serde(rename = "itemDeleted")]
    pub(crate) item_deleted: Option<Item>,
}

impl DeleteItemResponse {
    pub(crate) const MESSAGE: &'static str = "Item Eliminado";

    pub(crate) fn new(item_deleted: Option<Item>) -> Self {
        Self { message: Self::MESSAGE, item_deleted }
    }
}
