use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::core::config::Settings;
use crate::services::media::{sanitized_filename, MediaUploader, UploadError, UploadedFile};

/// Signed image uploads to Cloudinary's upload API.
#[derive(Debug, Clone)]
pub(crate) struct CloudinaryUploader {
    client: Client,
    endpoint: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

impl CloudinaryUploader {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let cloudinary = settings.cloudinary();
        let client = Client::builder().build().context("Failed to build Cloudinary HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1_1/{}/image/upload",
                cloudinary.api_base, cloudinary.cloud_name
            ),
            api_key: cloudinary.api_key.clone(),
            api_secret: cloudinary.api_secret.clone(),
            folder: settings.media().folder.trim_matches('/').to_string(),
        })
    }

    fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("timestamp", timestamp.to_string())];
        if !self.folder.is_empty() {
            params.push(("folder", self.folder.clone()));
        }
        let signature = sign_params(&params, &self.api_secret);
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params.push(("api_key", self.api_key.clone()));
        params
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(sanitized_filename(&file.file_name))
            .mime_str(&file.content_type)
            .map_err(|err| UploadError::Rejected(err.to_string()))?;

        let mut form = Form::new().part("file", part);
        for (key, value) in self.signed_params(OffsetDateTime::now_utc().unix_timestamp()) {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;

        let status = response.status();
        let raw_body =
            response.text().await.map_err(|err| UploadError::Transport(err.to_string()))?;
        let parsed = serde_json::from_str::<Value>(&raw_body).map_err(|err| {
            UploadError::Transport(format!(
                "Cloudinary returned non-JSON body (status {status}): {err}"
            ))
        })?;

        if !status.is_success() {
            return Err(UploadError::Rejected(extract_error_message(&parsed)));
        }

        let (url, public_id) = uploaded_location(&parsed)?;
        tracing::debug!(public_id, "Uploaded item image to Cloudinary");
        Ok(url.to_string())
    }
}

/// Hosted URL and public id from a successful upload response.
fn uploaded_location(body: &Value) -> Result<(&str, &str), UploadError> {
    let url = body
        .get("secure_url")
        .or_else(|| body.get("url"))
        .and_then(Value::as_str)
        .ok_or_else(|| UploadError::Rejected("response is missing secure_url".to_string()))?;
    let public_id = body.get("public_id").and_then(Value::as_str).unwrap_or("-");

    Ok((url, public_id))
}

/// `k1=v1&k2=v2` sorted by key, secret appended, SHA-256 hex.
fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined =
        sorted.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");

    hex::encode(Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

fn extract_error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
