use std::sync::Arc;

use domain::error::Result;
use domain::item::distinct_tags;
use domain::{
    DomainError, IdGenerator, ImageRef, ImageStore, Item, ItemFilter, ItemId, ItemRepository,
    ItemUpdate, Upload,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Coordinates item records with their image files.
///
/// Ordering rules:
/// - new uploads are stored before the record is written
/// - an upload whose record write fails is deleted again
/// - a replaced or removed image is deleted only after the record write
///   succeeded, and only best-effort
pub struct ItemService {
    repository: Arc<dyn ItemRepository>,
    images: Arc<dyn ImageStore>,
    ids: Arc<dyn IdGenerator>,
    // Serializes lookup + replace so the captured previous image is the one
    // actually overwritten.
    update_lock: Mutex<()>,
}

impl ItemService {
    pub fn new(
        repository: Arc<dyn ItemRepository>,
        images: Arc<dyn ImageStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            repository,
            images,
            ids,
            update_lock: Mutex::new(()),
        }
    }

    pub fn image_url(&self, item: &Item) -> String {
        self.images.resolve_url(&item.image_ref)
    }

    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>> {
        let items = self.repository.list_all().await?;
        Ok(filter.apply(items))
    }

    pub async fn get(&self, id: ItemId) -> Result<Item> {
        self.repository
            .find(id)
            .await?
            .ok_or(DomainError::ItemNotFound(id))
    }

    /// Every tag in use, sorted and de-duplicated.
    pub async fn tags(&self) -> Result<Vec<String>> {
        let items = self.repository.list_all().await?;
        Ok(distinct_tags(&items))
    }

    pub async fn create(&self, fields: ItemUpdate, upload: Option<Upload>) -> Result<Item> {
        let upload = upload
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DomainError::Validation("Image file is required".to_string()))?;

        let image = self.images.store(&upload).await?;
        let item = Item::create(self.ids.next_id(), fields, image.clone());

        match self.repository.append(item).await {
            Ok(item) => {
                info!(item_id = %item.id, image = %item.image_ref, "Item created");
                Ok(item)
            }
            Err(e) => {
                warn!(image = %image, error = %e, "Item write failed, discarding upload");
                self.images.delete(&image).await;
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        id: ItemId,
        mut fields: ItemUpdate,
        upload: Option<Upload>,
    ) -> Result<Item> {
        // Callers cannot point an item at an arbitrary file
        fields.image_ref = None;

        let new_image = match upload.filter(|u| !u.is_empty()) {
            Some(upload) => Some(self.images.store(&upload).await?),
            None => None,
        };

        let _guard = self.update_lock.lock().await;

        let previous = match self.repository.find(id).await {
            Ok(Some(item)) => item.image_ref,
            Ok(None) => {
                self.discard(new_image.as_ref()).await;
                return Err(DomainError::ItemNotFound(id));
            }
            Err(e) => {
                self.discard(new_image.as_ref()).await;
                return Err(e);
            }
        };

        if let Some(image) = &new_image {
            fields = fields.with_image(image.clone());
        }

        match self.repository.replace(id, fields).await {
            Ok(item) => {
                if let Some(image) = &new_image {
                    if *image != previous {
                        self.images.delete(&previous).await;
                    }
                }
                info!(item_id = %id, image_replaced = new_image.is_some(), "Item updated");
                Ok(item)
            }
            Err(e) => {
                self.discard(new_image.as_ref()).await;
                Err(e)
            }
        }
    }

    /// Removes the record, then its image. Unknown ids touch no files.
    pub async fn delete(&self, id: ItemId) -> Result<Item> {
        let _guard = self.update_lock.lock().await;

        let removed = self.repository.remove(id).await?;
        self.images.delete(&removed.image_ref).await;

        info!(item_id = %id, "Item deleted");
        Ok(removed)
    }

    async fn discard(&self, image: Option<&ImageRef>) {
        if let Some(image) = image {
            warn!(image = %image, "Discarding unreferenced upload");
            self.images.delete(image).await;
        }
    }
}
