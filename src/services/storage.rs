use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use uuid::Uuid;

use crate::core::config::Settings;
use crate::services::media::{sanitized_filename, MediaUploader, UploadError, UploadedFile};

/// S3-compatible bucket serving item images from a public base URL.
#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    client: Client,
    bucket: String,
    folder: String,
    public_base_url: String,
}

impl StorageService {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        if !settings.s3().is_configured() {
            return Ok(None);
        }

        let creds = Credentials::new(
            settings.s3().access_key.clone(),
            settings.s3().secret_key.clone(),
            None,
            None,
            "item-store-static",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(settings.s3().endpoint.clone())
            .region(aws_config::Region::new(settings.s3().region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config).force_path_style(true).build();
        let client = Client::from_conf(s3_config);

        Ok(Some(Self {
            client,
            bucket: settings.s3().bucket.clone(),
            folder: settings.media().folder.trim_matches('/').to_string(),
            public_base_url: settings.s3().public_base_url(),
        }))
    }

    pub(crate) fn object_key(&self, file_name: &str) -> String {
        let object_id = Uuid::new_v4();
        let file_name = sanitized_filename(file_name);
        if self.folder.is_empty() {
            format!("{object_id}_{file_name}")
        } else {
            format!("{}/{object_id}_{file_name}", self.folder)
        }
    }

    pub(crate) fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    pub(crate) async fn upload_bytes(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        Ok(())
    }
}

#[async_trait]
impl MediaUploader for StorageService {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let key = self.object_key(&file.file_name);
        self.upload_bytes(&key, &file.content_type, file.bytes.clone())
            .await
            .map_err(|err| UploadError::Transport(format!("{err:#}")))?;

        tracing::debug!(key = %key, size = file.bytes.len(), "Stored item image in bucket");
        Ok(self.public_url(&key))
    }
}
