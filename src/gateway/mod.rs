//! Signal-source gateway: fetch bucketed engagement signals for a user.
//!
//! The public seam is [`SignalSource`], which is infallible by contract:
//! any upstream failure (invalid token, network error, malformed response)
//! degrades to [`SignalBucket::default`] inside the gateway and is never
//! surfaced to map-generation callers. The engine performs no retries for
//! this dependency; one attempt, then degrade.

pub mod facebook;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::SignalBucket;

pub use facebook::{FacebookUser, GraphApiClient};

/// Errors internal to the fallible fetch layer. These never cross the
/// [`SignalSource`] boundary.
#[derive(Debug, Error)]
pub enum SignalFetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream rejected token (status {0})")]
    TokenRejected(u16),
    #[error("upstream error (status {0})")]
    Upstream(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Provider of bucketed engagement signals.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Fetch signals for the token's user over the trailing window.
    /// Always returns a bucket; failures degrade to the default.
    async fn fetch_signals(&self, access_token: &str, window_days: u32) -> SignalBucket;
}

/// Signal source for users with no social-data connection: always the
/// documented default bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSignalSource;

#[async_trait]
impl SignalSource for NullSignalSource {
    async fn fetch_signals(&self, _access_token: &str, _window_days: u32) -> SignalBucket {
        SignalBucket::default()
    }
}
