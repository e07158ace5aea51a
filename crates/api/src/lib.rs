//! # CalRelay App
//!
//! Background context wiring and the headless `calrelay` binary.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - A headless host binding for running outside a browser
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod utils;

pub use context::*;
