//! Background orchestrator
//!
//! Owns the `ActiveJob` record and the poll loop, and brokers every message
//! between the auth relay and the UI surfaces.

pub mod service;
pub mod state_machine;
pub mod validation;

pub use service::{HostPorts, Orchestrator, OrchestratorConfig};
