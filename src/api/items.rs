mod form;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::item::{DeleteItemResponse, Item, ItemPayload};
use crate::services::media::UploadError;

use self::form::ItemForm;

/// Room for multipart framing and text fields on top of the file itself.
const BODY_LIMIT_SLACK_BYTES: u64 = 1024 * 1024;

pub(crate) fn router(state: &AppState) -> Router<AppState> {
    let body_limit = state.settings().storage().max_upload_bytes() + BODY_LIMIT_SLACK_BYTES;

    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .layer(DefaultBodyLimit::max(usize::try_from(body_limit).unwrap_or(usize::MAX)))
}

async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.store().find_all().await?;
    Ok(Json(items))
}

async fn get_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Option<Item>>, ApiError> {
    let item = state.store().find_by_id(&id).await?;
    Ok(Json(item))
}

async fn create_item(
    State(state): State<AppState>,
    form: ItemForm,
) -> Result<Json<Item>, ApiError> {
    let payload = resolve_payload(&state, form).await?;
    let item = state.store().create(payload).await?;

    tracing::info!(item_id = %item.id, "Created item");
    Ok(Json(item))
}

async fn update_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
    form: ItemForm,
) -> Result<Json<Option<Item>>, ApiError> {
    let payload = resolve_payload(&state, form).await?;
    let item = state.store().find_by_id_and_update(&id, payload).await?;

    if item.is_none() {
        tracing::debug!(item_id = %id, "Update matched no item");
    }
    Ok(Json(item))
}

async fn delete_item(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    let item = state.store().find_by_id_and_delete(&id).await?;

    if item.is_some() {
        tracing::info!(item_id = %id, "Deleted item");
    }
    Ok(Json(DeleteItemResponse::new(item)))
}

/// Uploads the attached file, if any, and points `image` at its URL.
///
/// The upload is not rolled back if the store call that follows fails.
async fn resolve_payload(state: &AppState, form: ItemForm) -> Result<ItemPayload, ApiError> {
    let ItemForm { mut payload, file } = form;

    if let Some(file) = file {
        let uploader = state.media().ok_or(UploadError::NotConfigured)?;
        let url = uploader.upload(&file).await?;
        tracing::info!(
            provider = uploader.name(),
            field = %file.field,
            size = file.bytes.len(),
            "Uploaded item image"
        );
        payload.attach_image(url);
    }

    Ok(payload)
}
