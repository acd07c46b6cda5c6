//! Shared HTTP transport.

mod client;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpClient};
