use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::validation::validate_image_upload;
use crate::core::config::Settings;
use crate::core::state::AppState;
use crate::schemas::item::{ItemFields, ItemPayload};
use crate::services::media::{UploadError, UploadedFile, IMAGE_FORM_FIELD};

/// Write body for create and update: the loose payload plus an optional image.
///
/// Accepts JSON objects, url-encoded forms, and multipart forms. Only multipart
/// can carry a file, and only under `imagem`.
#[derive(Debug, Default)]
pub(crate) struct ItemForm {
    pub(crate) payload: ItemPayload,
    pub(crate) file: Option<UploadedFile>,
}

#[async_trait]
impl FromRequest<AppState> for ItemForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
            return read_multipart(multipart, state.settings()).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
            let mut fields = ItemFields::new();
            for (name, value) in pairs {
                insert_form_value(&mut fields, name, value);
            }
            return Ok(Self { payload: ItemPayload::from_fields(fields), file: None });
        }

        if content_type.starts_with("application/json") {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
            let fields = parse_json_object(&bytes)?;
            return Ok(Self { payload: ItemPayload::from_fields(fields), file: None });
        }

        // Bodies of any other type are not parsed.
        Ok(Self::default())
    }
}

fn parse_json_object(bytes: &[u8]) -> Result<ItemFields, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ItemFields::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ApiError::InvalidBody("Request body must be a JSON object".to_string())),
        Err(err) => Err(ApiError::InvalidBody(format!("Invalid JSON body: {err}"))),
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    settings: &Settings,
) -> Result<ItemForm, ApiError> {
    let storage = settings.storage();
    let max_bytes = storage.max_upload_bytes();
    let mut fields = ItemFields::new();
    let mut file: Option<UploadedFile> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::InvalidBody(err.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value =
                field.text().await.map_err(|err| ApiError::InvalidBody(err.body_text()))?;
            if !name.is_empty() {
                insert_form_value(&mut fields, name, value);
            }
            continue;
        };

        // Browsers send an empty, unnamed file part when no file was picked.
        if file_name.is_empty() {
            while field
                .chunk()
                .await
                .map_err(|err| ApiError::InvalidBody(err.body_text()))?
                .is_some()
            {}
            continue;
        }

        if name != IMAGE_FORM_FIELD || file.is_some() {
            return Err(ApiError::UnexpectedField(name));
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let mut upload =
            UploadedFile { field: name, file_name, content_type, bytes: Vec::new() };
        validate_image_upload(&upload, &storage.allowed_image_extensions)?;

        while let Some(chunk) =
            field.chunk().await.map_err(|err| ApiError::InvalidBody(err.body_text()))?
        {
            if upload.bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(UploadError::TooLarge(storage.max_upload_size_mb).into());
            }
            upload.bytes.extend_from_slice(&chunk);
        }

        file = Some(upload);
    }

    Ok(ItemForm { payload: ItemPayload::from_fields(fields), file })
}

/// Repeated names collect into an array, in arrival order.
fn insert_form_value(fields: &mut ItemFields, name: String, value: String) {
    match fields.get_mut(&name) {
        None => {
            fields.insert(name, Value::String(value));
        }
        Some(Value::Array(values)) => values.push(Value::String(value)),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, Value::String(value)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_form_values_become_arrays() {
        let mut fields = ItemFields::new();
        insert_form_value(&mut fields, "tag".to_string(), "a".to_string());
        insert_form_value(&mut fields, "tag".to_string(), "b".to_string());
        insert_form_value(&mut fields, "tag".to_string(), "c".to_string());
        insert_form_value(&mut fields, "title".to_string(), "Lamp".to_string());

        assert_eq!(Value::Object(fields), json!({"tag": ["a", "b", "c"], "title": "Lamp"}));
    }

    #[test]
    fn json_body_must_be_an_object() {
        assert!(parse_json_object(b"  ").expect("blank body").is_empty());
        assert_eq!(parse_json_object(br#"{"a":1}"#).expect("object")["a"], 1);

        let err = parse_json_object(b"[1,2]").expect_err("array body");
        assert_eq!(err.kind(), "invalid_body");

        let err = parse_json_object(b"{nope").expect_err("broken json");
        assert_eq!(err.kind(), "invalid_body");
    }
}
