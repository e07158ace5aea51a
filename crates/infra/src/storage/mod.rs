//! Storage area implementations
//!
//! - [`MemoryStorageArea`]: process-lifetime area, also the ephemeral
//!   fallback when the host has no session scope
//! - [`JsonFileStorageArea`]: durable area persisted as one JSON document
//! - [`StorageAdapter`]: uniform durable/ephemeral surface

pub mod adapter;
pub mod file;
pub mod memory;
mod registry;

pub use adapter::StorageAdapter;
pub use file::JsonFileStorageArea;
pub use memory::MemoryStorageArea;
