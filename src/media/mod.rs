//! Media module
//!
//! Persistence of decoded recipe images. The core only produces
//! content-addressed keys; where the bytes land is up to the `ImageStore`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::DecodedImage;

/// Errors raised by image stores
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Storage for recipe images.
///
/// Keys are path-like strings such as `recipes/images/<sha256>.png`.
/// Storing the same key twice is a no-op in effect, since keys are derived
/// from content.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return the key under which it is reachable
    async fn put(&self, image: &DecodedImage) -> Result<String, MediaError>;

    /// Check whether an image exists
    async fn exists(&self, key: &str) -> Result<bool, MediaError>;
}

/// ImageStore backed by the local filesystem under `root`
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under root. Rejects absolute keys and any
    /// component that would leave the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(key);
        let only_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if key.is_empty() || !only_normal {
            return Err(MediaError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, image: &DecodedImage) -> Result<String, MediaError> {
        let path = self.resolve(&image.key)?;

        match tokio::fs::read(&path).await {
            Ok(existing) if existing == image.bytes => return Ok(image.key.clone()),
            Ok(existing) => {
                tracing::warn!(
                    key = %image.key,
                    found = existing.len(),
                    expected = image.bytes.len(),
                    "Stored image does not match its key, rewriting"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let parent = path
            .parent()
            .ok_or_else(|| MediaError::InvalidKey(image.key.clone()))?;
        tokio::fs::create_dir_all(parent).await?;

        // Readers only ever see a complete file under the final name
        let staging = parent.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = write_then_rename(&staging, &path, &image.bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                tracing::warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging file");
            }
            return Err(e.into());
        }

        tracing::debug!(key = %image.key, bytes = image.bytes.len(), "Stored recipe image");
        Ok(image.key.clone())
    }

    async fn exists(&self, key: &str) -> Result<bool, MediaError> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

async fn write_then_rename(staging: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(staging).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(staging, target).await
}
