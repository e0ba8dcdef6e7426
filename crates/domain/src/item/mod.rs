mod entity;
mod filter;
mod image_ref;
mod item_id;
mod repository;
mod tags;

pub use entity::{Item, ItemUpdate, UNTITLED};
pub use filter::ItemFilter;
pub use image_ref::ImageRef;
pub use item_id::ItemId;
pub use repository::ItemRepository;
pub use tags::{distinct_tags, parse_tags};
