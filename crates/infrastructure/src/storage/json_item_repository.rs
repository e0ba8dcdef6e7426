use async_trait::async_trait;
use domain::{DomainError, Item, ItemId, ItemRepository, ItemUpdate};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// On-disk shape of the item document: `{ "items": [...] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ItemDocument {
    #[serde(default)]
    items: Vec<Item>,
}

/// Item store persisted as one pretty-printed JSON document.
///
/// Every mutation is a full read-modify-write under `write_lock`. Reads take
/// the same lock so they never race a rename in progress.
pub struct JsonItemRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonItemRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Largest id currently persisted, used to seed id generation on startup.
    pub async fn max_id(&self) -> Result<Option<ItemId>, DomainError> {
        let items = self.list_all().await?;
        Ok(items.iter().map(|item| item.id).max())
    }

    /// `None` when the document has never been written.
    async fn load(&self) -> Result<Option<ItemDocument>, DomainError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "Failed to read item document: {e}"
                )));
            }
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| DomainError::Storage(format!("Malformed item document: {e}")))
    }

    /// Writes to a sibling temp file and renames it over the document, so a
    /// failed write leaves the previous document intact.
    async fn save(&self, doc: &ItemDocument) -> Result<(), DomainError> {
        let payload = serde_json::to_vec_pretty(doc)
            .map_err(|e| DomainError::Storage(format!("Failed to encode item document: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::Storage(format!("Failed to create data directory: {e}"))
            })?;
        }

        let tmp = self.temp_path();
        if let Err(e) = tokio::fs::write(&tmp, &payload).await {
            discard_temp(&tmp).await;
            return Err(DomainError::Storage(format!(
                "Failed to write item document: {e}"
            )));
        }

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            discard_temp(&tmp).await;
            return Err(DomainError::Storage(format!(
                "Failed to replace item document: {e}"
            )));
        }

        debug!(items = doc.items.len(), "Item document saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "items.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn discard_temp(tmp: &Path) {
    match tokio::fs::remove_file(tmp).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp.display(), error = %e, "Failed to remove temporary item document"),
    }
}

#[async_trait]
impl ItemRepository for JsonItemRepository {
    async fn list_all(&self) -> Result<Vec<Item>, DomainError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load().await?.unwrap_or_default().items)
    }

    async fn find(&self, id: ItemId) -> Result<Option<Item>, DomainError> {
        let items = self.list_all().await?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    async fn append(&self, item: Item) -> Result<Item, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?.unwrap_or_default();

        if doc.items.iter().any(|existing| existing.id == item.id) {
            return Err(DomainError::DuplicateId(item.id));
        }

        doc.items.push(item.clone());
        self.save(&doc).await?;

        info!(item_id = %item.id, "Item appended");
        Ok(item)
    }

    async fn replace(&self, id: ItemId, update: ItemUpdate) -> Result<Item, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self
            .load()
            .await?
            .ok_or(DomainError::ItemNotFound(id))?;

        let item = doc
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(DomainError::ItemNotFound(id))?;
        update.apply_to(item);
        let updated = item.clone();

        self.save(&doc).await?;

        info!(item_id = %id, "Item replaced");
        Ok(updated)
    }

    async fn remove(&self, id: ItemId) -> Result<Item, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self
            .load()
            .await?
            .ok_or(DomainError::ItemNotFound(id))?;

        let index = doc
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(DomainError::ItemNotFound(id))?;
        let removed = doc.items.remove(index);

        self.save(&doc).await?;

        info!(item_id = %id, "Item removed");
        Ok(removed)
    }
}
