//! Client for the upstream patent-screening HTTP service.
//!
//! The upstream's authentication scheme and response shape are not
//! reliably documented, so the client probes an ordered list of
//! credential encodings ([`auth::AuthVariant`]) and coalesces the
//! heterogeneous response fields into canonical records ([`response`]).

pub mod auth;
pub mod client;
pub mod response;

pub use auth::AuthVariant;
pub use client::{ScreenerClient, ScreenerError};
