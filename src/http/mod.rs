//! HTTP client module
//!
//! Provides the HTTP client shared by the auth and upload calls.
//!
//! # Features
//!
//! - **Timeouts**: Every request is bounded, body included, 3s by default
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Error Mapping**: Status, timeout and 429 responses become typed errors

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
