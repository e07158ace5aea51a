//! # CalRelay Infrastructure
//!
//! Implementations of the core ports.
//!
//! This crate contains:
//! - Storage areas (in-memory and JSON file) and the scope adapter
//! - The browser compatibility layer (capability probe, panel adapter, web
//!   app links)
//! - The tokio polling adapter
//! - The in-process message bus
//! - The HTTP sessions client
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `calrelay-core`
//! - Contains all "impure" code (I/O, timers, network)

pub mod api;
pub mod compat;
pub mod config;
pub mod errors;
pub mod http;
pub mod messaging;
pub mod polling;
pub mod storage;

// Re-export commonly used items
pub use api::{ApiError, SessionsClient};
pub use compat::{HostApis, PanelAdapter, WebAppLinks};
pub use errors::InfraError;
pub use http::HttpClient;
pub use messaging::{BusClient, MessageBus};
pub use polling::TokioPollingAdapter;
pub use storage::{JsonFileStorageArea, MemoryStorageArea, StorageAdapter};
