//! Backend cache administration.

use crate::{AdminClient, Method, Operation, Params, Result};

/// Admin operations on the backend's cache.
#[derive(Debug, Clone)]
pub struct CacheService {
    client: AdminClient,
}

impl CacheService {
    /// `PUT /cache/flush`
    pub const FLUSH: Operation =
        Operation::new("CacheService", "flushAndClear", Method::Put, "/cache/flush");
    /// `GET /cache/enabled`
    pub const IS_ENABLED: Operation =
        Operation::new("CacheService", "isEnabled", Method::Get, "/cache/enabled");
    /// `PUT /cache/toggle`
    pub const TOGGLE: Operation =
        Operation::new("CacheService", "toggle", Method::Put, "/cache/toggle");

    /// Create the service.
    #[must_use]
    pub const fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// Write cached entries back and empty the cache.
    pub async fn flush_and_clear(&self) -> Result<()> {
        self.client.call_unit(&Self::FLUSH, Params::new()).await
    }

    /// Whether the cache is enabled.
    pub async fn is_enabled(&self) -> Result<bool> {
        self.client.call_json(&Self::IS_ENABLED, Params::new()).await
    }

    /// Switch the cache on or off; returns the new state.
    pub async fn toggle(&self) -> Result<bool> {
        self.client.call_json(&Self::TOGGLE, Params::new()).await
    }
}
