//! Remote sessions API client
//!
//! Wraps [`HttpClient`](crate::http::HttpClient) with bearer
//! authentication, status classification and user-facing error messages.

pub mod client;
pub mod errors;

pub use client::SessionsClient;
pub use errors::{ApiError, ApiErrorCategory};
