//! Catalog cache.
//!
//! A narrow get/put/invalidate capability injected into the coffee repository.
//! The cache is never authoritative: callers treat every failure as a miss.

mod config;
mod keys;
mod lock;
mod memory;
mod redis_store;
mod store;

use std::sync::Arc;

pub use config::{CacheBackend, CacheConfig};
pub use keys::{MENU_NAMESPACE, menu_page_key};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{CacheError, CacheStore, NoopStore};

pub const METRIC_CATALOG_CACHE_HIT: &str = "dollar_coffee_catalog_cache_hit_total";
pub const METRIC_CATALOG_CACHE_MISS: &str = "dollar_coffee_catalog_cache_miss_total";
pub const METRIC_CATALOG_CACHE_ERROR: &str = "dollar_coffee_catalog_cache_error_total";
pub const METRIC_CATALOG_CACHE_INVALIDATE: &str = "dollar_coffee_catalog_cache_invalidate_total";

/// Build the store selected by `config.backend`.
pub fn build_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match config.backend {
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                CacheError::unavailable("cache.redis_url is required for the redis backend")
            })?;
            Ok(Arc::new(RedisStore::connect(url)?))
        }
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new(config.memory_page_limit_non_zero()))),
        CacheBackend::Disabled => Ok(Arc::new(NoopStore)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_backend_requires_url() {
        let config = CacheConfig {
            backend: CacheBackend::Redis,
            redis_url: None,
            ..Default::default()
        };
        assert!(build_store(&config).is_err());
    }

    #[test]
    fn memory_and_disabled_backends_build_without_io() {
        for backend in [CacheBackend::Memory, CacheBackend::Disabled] {
            let config = CacheConfig {
                backend,
                ..Default::default()
            };
            assert!(build_store(&config).is_ok());
        }
    }
}
