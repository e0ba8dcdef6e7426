use crate::DomainError;
use crate::item::{Item, ItemId, ItemUpdate};
use async_trait::async_trait;

/// Repository interface for Item persistence
///
/// Implementations own the whole item document and must serialize every
/// read-modify-write so concurrent mutations cannot lose updates.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All items in insertion order. A store that was never written is empty.
    async fn list_all(&self) -> Result<Vec<Item>, DomainError>;

    /// Find a single item by id
    async fn find(&self, id: ItemId) -> Result<Option<Item>, DomainError>;

    /// Append a new item to the end of the document
    async fn append(&self, item: Item) -> Result<Item, DomainError>;

    /// Merge `update` over the stored item and persist it
    async fn replace(&self, id: ItemId, update: ItemUpdate) -> Result<Item, DomainError>;

    /// Remove the item and hand it back so its image can be cleaned up
    async fn remove(&self, id: ItemId) -> Result<Item, DomainError>;
}
