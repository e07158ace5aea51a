//! Cross-context messaging ports

pub mod ports;
