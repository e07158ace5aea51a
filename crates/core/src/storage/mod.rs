//! Key-value storage ports and typed repositories

pub mod ports;
pub mod repository;
