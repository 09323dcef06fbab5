use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::{MediaProvider, Settings};
use crate::services::cloudinary::CloudinaryUploader;
use crate::services::storage::StorageService;

/// Multipart field that carries the item image.
pub(crate) const IMAGE_FORM_FIELD: &str = "imagem";

#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub(crate) field: String,
    pub(crate) file_name: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

impl UploadedFile {
    pub(crate) fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Error)]
pub(crate) enum UploadError {
    #[error("media host is not configured")]
    NotConfigured,
    #[error("file size exceeds {0}MB limit")]
    TooLarge(u64),
    #[error("file must have an extension")]
    MissingExtension,
    #[error("file extension '{0}' is not allowed")]
    ExtensionNotAllowed(String),
    #[error("media host rejected upload: {0}")]
    Rejected(String),
    #[error("media host request failed: {0}")]
    Transport(String),
}

/// Stores an uploaded file with an external media host and yields its public URL.
#[async_trait]
pub(crate) trait MediaUploader: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError>;
}

pub(crate) async fn from_settings(
    settings: &Settings,
) -> anyhow::Result<Option<Arc<dyn MediaUploader>>> {
    let provider = settings.media_provider();
    tracing::debug!(provider = provider.as_str(), "Resolving media host");

    let uploader: Option<Arc<dyn MediaUploader>> = match provider {
        MediaProvider::Cloudinary => {
            if !settings.cloudinary().is_configured() {
                tracing::warn!("Cloudinary selected but credentials are missing; uploads disabled");
                return Ok(None);
            }
            Some(Arc::new(CloudinaryUploader::from_settings(settings)?))
        }
        MediaProvider::S3 => StorageService::from_settings(settings)
            .await?
            .map(|storage| Arc::new(storage) as Arc<dyn MediaUploader>),
        MediaProvider::Disabled => None,
    };

    match &uploader {
        Some(uploader) => tracing::info!(provider = uploader.name(), "Media uploads enabled"),
        None => tracing::warn!("No media host configured; requests carrying a file will fail"),
    }

    Ok(uploader)
}

pub(crate) fn sanitized_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}
