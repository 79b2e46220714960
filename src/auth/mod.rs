//! Tenant access token cache
//!
//! Upload requests authenticate with a short-lived bearer token. The
//! `TokenCache` keeps the token in the local store and asks the auth
//! endpoint for a new one only when the cached token is missing or about to
//! expire.

mod cache;
mod store;
mod types;

pub use cache::TokenCache;
pub use store::TokenStore;
pub use types::{expiry_safety_margin, CachedToken, IssuedToken, EXPIRY_SAFETY_MARGIN_SECS};
