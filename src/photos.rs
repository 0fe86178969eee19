//! Photo storage for the onboarding photo step.
//!
//! The planner only ever checks whether a reference is present. What the
//! reference points at is the store's business.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::PhotoError;

/// Opaque handle to an uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(String);

impl PhotoRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank reference counts as no photo.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Blob storage for uploaded photos.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store the bytes and return a reference to them.
    async fn store(&self, user_id: &str, bytes: &[u8]) -> Result<PhotoRef, PhotoError>;

    /// Delete a stored photo. Unknown references are not an error.
    async fn remove(&self, photo: &PhotoRef) -> Result<(), PhotoError>;
}

/// Stores photos as files named by a random UUID under a root directory.
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path for a reference issued by this store.
    pub fn path_for(&self, photo: &PhotoRef) -> PathBuf {
        self.root.join(photo.as_str())
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn store(&self, user_id: &str, bytes: &[u8]) -> Result<PhotoRef, PhotoError> {
        if bytes.is_empty() {
            return Err(PhotoError::Empty);
        }
        tokio::fs::create_dir_all(&self.root).await?;

        let photo = PhotoRef::new(Uuid::new_v4().to_string());
        tokio::fs::write(self.path_for(&photo), bytes).await?;

        info!(user_id, photo = %photo, size = bytes.len(), "Stored progress photo");
        Ok(photo)
    }

    async fn remove(&self, photo: &PhotoRef) -> Result<(), PhotoError> {
        // Only UUID names were issued here; anything else never maps to a file.
        if Uuid::parse_str(photo.as_str()).is_err() {
            debug!(photo = %photo, "Not a stored photo, nothing to remove");
            return Ok(());
        }
        match tokio::fs::remove_file(self.path_for(photo)).await {
            Ok(()) => {
                info!(photo = %photo, "Removed progress photo");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reference_is_empty() {
        assert!(PhotoRef::new("").is_empty());
        assert!(PhotoRef::new("  ").is_empty());
        assert!(!PhotoRef::new("abc").is_empty());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&PhotoRef::new("p-1")).unwrap();
        assert_eq!(json, "\"p-1\"");
    }

    #[tokio::test]
    async fn stores_bytes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path().join("photos"));

        let photo = store.store("user-1", b"jpeg bytes").await.unwrap();
        assert!(!photo.is_empty());

        let written = tokio::fs::read(store.path_for(&photo)).await.unwrap();
        assert_eq!(written, b"jpeg bytes");
    }

    #[tokio::test]
    async fn each_upload_gets_a_new_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path());

        let a = store.store("user-1", b"a").await.unwrap();
        let b = store.store("user-1", b"b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path());

        let err = store.store("user-1", b"").await.unwrap_err();
        assert!(matches!(err, PhotoError::Empty));
    }

    #[tokio::test]
    async fn remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path());

        let photo = store.store("user-1", b"jpeg").await.unwrap();
        store.remove(&photo).await.unwrap();
        assert!(!store.path_for(&photo).exists());

        // Already gone.
        store.remove(&photo).await.unwrap();
    }

    #[tokio::test]
    async fn remove_ignores_foreign_references() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();
        let store = LocalPhotoStore::new(dir.path().join("photos"));

        store.remove(&PhotoRef::new("../keep.txt")).await.unwrap();
        store.remove(&PhotoRef::new("external-ref")).await.unwrap();
        assert!(outside.exists());
    }
}
