//! In-process cache backend.
//!
//! Each namespace is an LRU of pages with one shared expiry, mirroring a Redis
//! hash whose `EXPIRE` is refreshed on every write.

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;

use super::lock::mutex_lock;
use super::store::{CacheError, CacheStore};

const SOURCE: &str = "cache::memory";

struct Namespace {
    entries: LruCache<String, Bytes>,
    expires_at: Instant,
}

pub struct MemoryStore {
    namespaces: Mutex<HashMap<String, Namespace>>,
    page_limit: NonZeroUsize,
}

impl MemoryStore {
    pub fn new(page_limit: NonZeroUsize) -> Self {
        Self {
            namespaces: Mutex::new(HashMap::new()),
            page_limit,
        }
    }

    /// Number of live pages cached under `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        let now = Instant::now();
        mutex_lock(&self.namespaces, SOURCE, "len")
            .get(namespace)
            .filter(|ns| ns.expires_at > now)
            .map_or(0, |ns| ns.entries.len())
    }

    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, CacheError> {
        let now = Instant::now();
        let mut namespaces = mutex_lock(&self.namespaces, SOURCE, "get");
        match namespaces.get_mut(namespace) {
            None => return Ok(None),
            Some(ns) if ns.expires_at > now => return Ok(ns.entries.get(key).cloned()),
            Some(_) => {}
        }
        namespaces.remove(namespace);
        Ok(None)
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: Bytes,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        let mut namespaces = mutex_lock(&self.namespaces, SOURCE, "put");
        let ns = namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| Namespace {
                entries: LruCache::new(self.page_limit),
                expires_at,
            });
        if ns.expires_at <= now {
            ns.entries.clear();
        }
        ns.entries.put(key.to_string(), value);
        ns.expires_at = expires_at;
        Ok(())
    }

    async fn invalidate(&self, namespace: &str) -> Result<(), CacheError> {
        mutex_lock(&self.namespaces, SOURCE, "invalidate").remove(namespace);
        Ok(())
    }
}
