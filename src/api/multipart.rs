//! Multipart form staging

use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A file written to the staging directory. Removed on drop if still present.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn remove_staged(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to clean up {}: {}", path.display(), e);
        }
    }
}

impl Drop for StagedFile {
    // Inside a runtime the removal goes to the blocking pool.
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_staged(&path));
            }
            Err(_) => remove_staged(&path),
        }
    }
}

/// Text fields and staged files from a multipart body
#[derive(Debug, Default)]
pub struct StagedForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, StagedFile>,
}

impl StagedForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn file(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(StagedFile::path)
    }
}

/// Keep only the extension of a client-supplied file name
fn staged_name(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
    match extension {
        Some(ext) => format!("{}.{}", uuid::Uuid::new_v4(), ext.to_lowercase()),
        None => uuid::Uuid::new_v4().to_string(),
    }
}

/// Read a multipart body, writing file parts into `staging_dir`.
/// Empty file parts are treated as absent.
pub async fn stage_multipart(mut multipart: Multipart, staging_dir: &Path) -> Result<StagedForm> {
    let mut form = StagedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let staged_as = field.file_name().map(staged_name);
        match staged_as {
            Some(staged) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?;
                if bytes.is_empty() {
                    continue;
                }
                tokio::fs::create_dir_all(staging_dir).await?;
                let path = staging_dir.join(staged);
                tokio::fs::write(&path, &bytes).await?;
                form.files.insert(name, StagedFile { path });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staged_name_keeps_extension_only() {
        let name = staged_name("../../etc/passwd.PNG");
        assert!(name.ends_with(".png"));
        assert!(!name.contains('/'));

        let name = staged_name("no-extension");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_staged_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leftover.png");
        std::fs::write(&path, b"x").unwrap();

        drop(StagedFile { path: path.clone() });
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_staged_file_removed_on_drop_inside_runtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leftover.png");
        std::fs::write(&path, b"x").unwrap();

        drop(StagedFile { path: path.clone() });

        for _ in 0..50 {
            if !path.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!path.exists());
    }
}
