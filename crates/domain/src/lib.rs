//! Domain layer - Pure business logic with no external dependencies
//!
//! This crate contains:
//! - Entities (Item) and value objects (ItemId, ImageRef, ItemUpdate)
//! - Tag parsing and search filtering rules
//! - Port traits (ItemRepository, ImageStore, IdGenerator)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Merge and validation rules enforced at domain level
//! - Testable in isolation

pub mod error;
pub mod id_generator;
pub mod image;
pub mod item;

// Re-export commonly used types
pub use error::DomainError;
pub use id_generator::{IdGenerator, MonotonicIdGenerator};
pub use image::{ImageStore, Upload};
pub use item::{ImageRef, Item, ItemFilter, ItemId, ItemRepository, ItemUpdate};
