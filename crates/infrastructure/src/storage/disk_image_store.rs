use async_trait::async_trait;
use chrono::Utc;
use domain::{DomainError, ImageRef, ImageStore, Upload};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_URL_PREFIX: &str = "/uploads";
const NAME_ATTEMPTS: usize = 3;

/// Stores uploaded images as plain files inside one directory.
pub struct DiskImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl DiskImageStore {
    /// Opens the store, creating `root` if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to create uploads directory: {e}")))?;

        Ok(Self {
            root,
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        })
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `None` for refs that would escape the uploads directory.
    fn path_of(&self, image: &ImageRef) -> Option<PathBuf> {
        image.is_safe().then(|| self.root.join(image.as_str()))
    }
}

/// `<nanos>-<random>-<sanitized original name>`
fn unique_name(original: &str) -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_millis());
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", nanos, &random[..10], sanitize_file_name(original))
}

/// Keeps only the final path component and replaces anything outside
/// `[A-Za-z0-9._-]`, so the extension survives but no path can be smuggled in.
pub(crate) fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn store(&self, upload: &Upload) -> Result<ImageRef, DomainError> {
        let mut last_err = None;

        for _ in 0..NAME_ATTEMPTS {
            let name = unique_name(&upload.file_name);
            let path = self.root.join(&name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    last_err = Some(e);
                    continue;
                }
                Err(e) => {
                    return Err(DomainError::Storage(format!(
                        "Failed to create image file: {e}"
                    )));
                }
            };

            let written = async {
                file.write_all(&upload.bytes).await?;
                file.flush().await
            }
            .await;

            if let Err(e) = written {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    warn!(image = %name, error = %cleanup, "Failed to remove partial image file");
                }
                return Err(DomainError::Storage(format!(
                    "Failed to write image file: {e}"
                )));
            }

            debug!(image = %name, bytes = upload.bytes.len(), "Image stored");
            return Ok(ImageRef::new(name));
        }

        Err(DomainError::Storage(format!(
            "Could not allocate a unique image name: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn resolve_url(&self, image: &ImageRef) -> String {
        format!("{}/{}", self.url_prefix, image.as_str())
    }

    async fn delete(&self, image: &ImageRef) {
        let Some(path) = self.path_of(image) else {
            warn!(image = %image, "Refusing to delete image outside uploads directory");
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(image = %image, "Image deleted"),
            Err(e) => warn!(image = %image, error = %e, "Could not delete image file"),
        }
    }

    async fn exists(&self, image: &ImageRef) -> bool {
        match self.path_of(image) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }
}
