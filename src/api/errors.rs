use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::item_store::StoreError;
use crate::services::media::UploadError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    kind: &'static str,
    detail: String,
}

/// Every failure is reported as 400; `kind` lets callers tell them apart.
#[derive(Debug)]
pub(crate) enum ApiError {
    InvalidId(String),
    Store(String),
    Upload(String),
    InvalidBody(String),
    UnexpectedField(String),
}

impl ApiError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidId(_) => "invalid_id",
            ApiError::Store(_) => "store",
            ApiError::Upload(_) => "upload",
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::UnexpectedField(_) => "unexpected_field",
        }
    }

    fn into_detail(self) -> String {
        match self {
            ApiError::InvalidId(detail)
            | ApiError::Store(detail)
            | ApiError::Upload(detail)
            | ApiError::InvalidBody(detail) => detail,
            ApiError::UnexpectedField(field) => format!("Unexpected file field '{field}'"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(_) => ApiError::InvalidId(err.to_string()),
            StoreError::Database(ref source) => {
                tracing::error!(error = ?source, "Item store call failed");
                ApiError::Store(err.to_string())
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let kind = self.kind();
        let detail = self.into_detail();
        tracing::warn!(kind, detail = %detail, "Request rejected");

        (status, Json(ErrorResponse { status: status.as_u16(), kind, detail })).into_response()
    }
}
