//! Polling timer port

pub mod ports;
