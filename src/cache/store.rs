//! Cache capability trait and the no-op implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache command failed: {0}")]
    Command(String),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    pub fn command(err: impl std::fmt::Display) -> Self {
        Self::Command(err.to_string())
    }
}

/// Key-value store grouping entries under a namespace.
///
/// Implementations report transport failures honestly; absorbing them is the
/// caller's job.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Store `value` and reset the namespace expiry to `ttl` from now.
    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: Bytes,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Drop every entry stored under `namespace`.
    async fn invalidate(&self, namespace: &str) -> Result<(), CacheError>;
}

/// Store that never holds anything. Every read is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _namespace: &str,
        _key: &str,
        _value: Bytes,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _namespace: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_store_always_misses() {
        let store = NoopStore;
        store
            .put("menu", "key", Bytes::from_static(b"[]"), Duration::from_secs(60))
            .await
            .expect("put succeeds");
        assert!(store.get("menu", "key").await.expect("get").is_none());
    }
}
