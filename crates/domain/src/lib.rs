//! # CalRelay Domain
//!
//! Data types shared by every execution context of the extension.
//!
//! This crate contains:
//! - The stored records (`AuthState`, `ActiveJob`) and the remote
//!   `PollSession` they are derived from
//! - The cross-context message protocol
//! - Storage schema keys and domain constants
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other CalRelay crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
