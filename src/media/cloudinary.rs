//! Cloudinary unsigned uploads

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;

use super::{MediaUploader, UploadedMedia};
use crate::error::{Error, Result};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
    #[serde(default)]
    secure_url: Option<String>,
}

pub struct CloudinaryUploader {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: &str, upload_preset: &str) -> Self {
        Self::with_endpoint(format!("{}/{}/auto/upload", API_BASE, cloud_name), upload_preset)
    }

    /// Point at a different upload endpoint
    pub fn with_endpoint(endpoint: String, upload_preset: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            upload_preset: upload_preset.to_string(),
        }
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Upstream(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("provider returned {}", status)));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Unexpected provider response: {}", e)))?;
        tracing::info!("Resource uploaded: {}", body.url);

        Ok(UploadedMedia {
            url: body.secure_url.unwrap_or(body.url),
        })
    }
}
