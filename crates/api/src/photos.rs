//! Photo-storage boundary.
//!
//! Assignment and release accept evidentiary photo attachments; this module
//! writes them under a configured root and hands back stable relative paths.
//! Only those paths are recorded -- the core never reads the bytes back.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use uuid::Uuid;

use crate::error::AppError;

/// Image extensions accepted for evidentiary photos.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Writes photo attachments to local disk under a configured root.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store a batch of photos, returning their relative paths in input order.
    ///
    /// Filenames are regenerated (`<prefix>_<uuid>.<ext>`) so client-supplied
    /// names never touch the filesystem. Any unsupported extension rejects
    /// the whole batch before a single byte is written.
    pub async fn store_batch(
        &self,
        prefix: &str,
        photos: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<String>, AppError> {
        if photos.is_empty() {
            return Ok(Vec::new());
        }

        let mut planned = Vec::with_capacity(photos.len());
        for (filename, bytes) in photos {
            let ext = extension_of(&filename)?;
            let relative = format!("{prefix}_{}.{ext}", Uuid::new_v4());
            planned.push((relative, bytes));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::InternalError(format!("Photo storage unavailable: {e}")))?;

        let writes = planned.into_iter().map(|(relative, bytes)| {
            let path = self.root.join(&relative);
            async move {
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|e| AppError::InternalError(format!("Failed to store photo: {e}")))?;
                Ok::<String, AppError>(relative)
            }
        });

        try_join_all(writes).await
    }

    /// Absolute path of a stored photo, for serving or cleanup tooling.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn extension_of(filename: &str) -> Result<&str, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|allowed| **allowed == ext)
        .copied()
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unsupported photo format '{filename}'. Supported: .jpg, .jpeg, .png, .webp"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_batch_and_returns_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());

        let paths = store
            .store_batch(
                "assign_5",
                vec![
                    ("one.jpg".into(), vec![1, 2, 3]),
                    ("two.PNG".into(), vec![4, 5]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].starts_with("assign_5_") && paths[0].ends_with(".jpg"));
        assert!(paths[1].ends_with(".png"));
        for relative in &paths {
            assert!(store.resolve(relative).exists());
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_extension_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());

        let result = store
            .store_batch(
                "rel_1",
                vec![
                    ("ok.jpg".into(), vec![1]),
                    ("payload.exe".into(), vec![2]),
                ],
            )
            .await;

        assert!(result.is_err());
        // The valid file must not have been written either.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().join("never-created"));
        let paths = store.store_batch("x", Vec::new()).await.unwrap();
        assert!(paths.is_empty());
        assert!(!dir.path().join("never-created").exists());
    }
}
