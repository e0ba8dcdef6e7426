use crate::item::ItemId;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
