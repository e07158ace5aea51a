//! Page-context auth relay

pub mod service;

pub use service::{relay_delay, AuthRelay, ObservedToken};
