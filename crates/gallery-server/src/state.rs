use application::ItemService;
use domain::{DomainError, ImageStore, Item, ItemRepository, MonotonicIdGenerator};
use infrastructure::{DiskImageStore, JsonItemRepository, ServerConfig};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// URL prefix uploaded images are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// An item as sent to clients, with its servable image URL.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub image_url: String,
}

pub struct AppState {
    pub items: ItemService,
    pub images: Arc<DiskImageStore>,
    pub repository: Arc<JsonItemRepository>,
    pub config: ServerConfig,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> Result<Self, DomainError> {
        let repository = Arc::new(JsonItemRepository::new(config.data_file.clone()));
        let images = Arc::new(
            DiskImageStore::new(config.uploads_dir.clone())
                .await?
                .with_url_prefix(UPLOADS_ROUTE),
        );

        // Seed above the largest stored id so restarts never reuse one. An
        // unreadable document must not stop the server: requests report it.
        let ids = match repository.max_id().await {
            Ok(Some(max)) => MonotonicIdGenerator::starting_after(max),
            Ok(None) => MonotonicIdGenerator::new(),
            Err(e) => {
                warn!(error = %e, "Could not read stored ids, seeding from the clock");
                MonotonicIdGenerator::new()
            }
        };

        let items = ItemService::new(repository.clone(), images.clone(), Arc::new(ids));

        Ok(Self {
            items,
            images,
            repository,
            config,
        })
    }

    pub fn view(&self, item: Item) -> ItemView {
        let image_url = self.items.image_url(&item);
        ItemView { item, image_url }
    }

    /// Logs every item whose image file is missing. Returns how many.
    pub async fn report_missing_images(&self) -> Result<usize, DomainError> {
        let mut missing = 0;
        for item in self.repository.list_all().await? {
            if !self.images.exists(&item.image_ref).await {
                warn!(item_id = %item.id, image = %item.image_ref, "Item image file is missing");
                missing += 1;
            }
        }
        if missing == 0 {
            info!("All item images present");
        }
        Ok(missing)
    }
}
