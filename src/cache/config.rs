//! Cache configuration.
//!
//! Resolved from the `[cache]` section of `dollar-coffee.toml`.

use std::{num::NonZeroUsize, time::Duration};

use serde::Deserialize;

const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_MEMORY_PAGE_LIMIT: usize = 256;

/// Which store backs the catalog cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    #[default]
    Memory,
    Disabled,
}

impl CacheBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheBackend::Redis => "redis",
            CacheBackend::Memory => "memory",
            CacheBackend::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Connection URL, required by the redis backend.
    pub redis_url: Option<String>,
    /// Expiry applied to the menu namespace on every write.
    pub ttl: Duration,
    /// Maximum cached pages per namespace in the memory backend.
    pub memory_page_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: None,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            memory_page_limit: DEFAULT_MEMORY_PAGE_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend,
            redis_url: settings.redis_url.clone(),
            ttl: settings.ttl,
            memory_page_limit: settings.memory_page_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the memory page limit as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_page_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_page_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
