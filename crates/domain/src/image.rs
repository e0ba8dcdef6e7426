use async_trait::async_trait;
use bytes::Bytes;

use crate::DomainError;
use crate::item::ImageRef;

/// An uploaded image as received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Browsers submit an empty file part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Owns the uploaded image files.
///
/// Callers decide *when* a file becomes unreferenced; the store only knows how
/// to name, place and remove files.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `upload` under a fresh unique name
    async fn store(&self, upload: &Upload) -> Result<ImageRef, DomainError>;

    /// Public URL path the static layer serves `image` from. No I/O.
    fn resolve_url(&self, image: &ImageRef) -> String;

    /// Best-effort removal. Failures are logged, never returned.
    async fn delete(&self, image: &ImageRef);

    /// Whether the backing file is currently present
    async fn exists(&self, image: &ImageRef) -> bool;
}
