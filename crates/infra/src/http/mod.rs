//! HTTP transport with idempotency-aware retries

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, TransportError};
