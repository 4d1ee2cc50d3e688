//! Uploads kept on the local filesystem and served by the API

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{MediaUploader, UploadedMedia};
use crate::error::{Error, Result};

pub struct LocalMediaUploader {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalMediaUploader {
    pub fn new(dir: PathBuf, public_base_url: String) -> Self {
        Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaUploader for LocalMediaUploader {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia> {
        let name = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}.{}", uuid::Uuid::new_v4(), ext),
            None => uuid::Uuid::new_v4().to_string(),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Upstream(format!("Cannot create media directory: {}", e)))?;
        tokio::fs::copy(path, self.dir.join(&name))
            .await
            .map_err(|e| Error::Upstream(format!("Cannot store {}: {}", path.display(), e)))?;

        Ok(UploadedMedia {
            url: format!("{}/{}", self.public_base_url, name),
        })
    }
}
