//! Infrastructure layer - Filesystem-backed adapters and configuration

pub mod config;
pub mod storage;

pub use config::ServerConfig;
pub use storage::{DiskImageStore, JsonItemRepository};
