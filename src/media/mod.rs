//! Profile image uploads

mod cloudinary;
mod local;

pub use cloudinary::CloudinaryUploader;
pub use local::LocalMediaUploader;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{MediaConfig, MediaProvider};
use crate::error::{Error, Result};

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
}

/// Stores a locally staged file somewhere durable and returns its URL
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia>;
}

/// Build the uploader selected by configuration
pub fn uploader_from_config(config: &MediaConfig) -> Result<Arc<dyn MediaUploader>> {
    match config.provider {
        MediaProvider::Local => Ok(Arc::new(LocalMediaUploader::new(
            config.local_dir.clone(),
            config.public_base_url.clone(),
        ))),
        MediaProvider::Cloudinary => {
            let cloudinary = config.cloudinary.as_ref().ok_or_else(|| {
                Error::Config("[media.cloudinary] section is required".to_string())
            })?;
            Ok(Arc::new(CloudinaryUploader::new(
                &cloudinary.cloud_name,
                &cloudinary.upload_preset,
            )))
        }
    }
}

/// Upload a staged file and remove it locally afterwards.
///
/// On failure the staged file is deleted before `Error::Upstream` is returned.
pub async fn upload_staged(uploader: &dyn MediaUploader, path: &Path) -> Result<UploadedMedia> {
    let result = uploader.upload(path).await;
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove staged file {}: {}", path.display(), e);
        }
    }

    match result {
        Ok(media) => {
            tracing::debug!("Uploaded {} to {}", path.display(), media.url);
            Ok(media)
        }
        Err(Error::Upstream(reason)) => {
            tracing::warn!("Media upload failed for {}: {}", path.display(), reason);
            Err(Error::Upstream(reason))
        }
        Err(other) => {
            tracing::warn!("Media upload failed for {}: {}", path.display(), other);
            Err(Error::Upstream(other.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingUploader;

    #[async_trait]
    impl MediaUploader for FailingUploader {
        async fn upload(&self, _path: &Path) -> Result<UploadedMedia> {
            Err(Error::Io(std::io::Error::other("connection refused")))
        }
    }

    #[tokio::test]
    async fn test_failed_upload_removes_staged_file() {
        let dir = TempDir::new().unwrap();
        let staged = dir.path().join("avatar.png");
        std::fs::write(&staged, b"png").unwrap();

        let result = upload_staged(&FailingUploader, &staged).await;
        assert!(matches!(result, Err(Error::Upstream(_))));
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_successful_upload_removes_staged_file() {
        let staging = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        let staged = staging.path().join("avatar.png");
        std::fs::write(&staged, b"png").unwrap();

        let uploader = LocalMediaUploader::new(media.path().to_path_buf(), "/media".to_string());
        let uploaded = upload_staged(&uploader, &staged).await.unwrap();

        assert!(uploaded.url.starts_with("/media/"));
        assert!(uploaded.url.ends_with(".png"));
        assert!(!staged.exists());
    }

    #[test]
    fn test_cloudinary_requires_section() {
        let config = MediaConfig {
            provider: MediaProvider::Cloudinary,
            ..MediaConfig::default()
        };
        assert!(matches!(uploader_from_config(&config), Err(Error::Config(_))));
    }
}
