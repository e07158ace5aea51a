//! Remote session-processing API port

pub mod ports;
