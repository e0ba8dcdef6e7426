//! Application layer - Use cases coordinating item records and image files

pub mod item;

pub use item::ItemService;
