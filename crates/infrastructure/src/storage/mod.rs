pub mod disk_image_store;
pub mod json_item_repository;

pub use disk_image_store::DiskImageStore;
pub use json_item_repository::JsonItemRepository;
