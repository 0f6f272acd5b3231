//! Coffee repository with a cache-aside read path over the menu namespace.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use metrics::counter;
use tracing::{debug, warn};

use crate::application::repos::{CoffeePageQuery, CoffeeRepository, RepoError};
use crate::application::storage::CoffeeStorage;
use crate::cache::{
    CacheStore, MENU_NAMESPACE, METRIC_CATALOG_CACHE_ERROR, METRIC_CATALOG_CACHE_HIT,
    METRIC_CATALOG_CACHE_INVALIDATE, METRIC_CATALOG_CACHE_MISS, menu_page_key,
};
use crate::domain::entities::{CoffeeRecord, NewCoffee};

const SOURCE: &str = "application::repositories::coffees";

/// Writes go to storage and then drop every cached menu page; paginated reads
/// are served from the cache when possible.
///
/// Cache failures of any kind degrade to a miss and never fail the call.
pub struct CachedCoffeeRepository<S> {
    storage: Arc<S>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl<S> CachedCoffeeRepository<S> {
    pub fn new(storage: Arc<S>, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            storage,
            cache,
            ttl,
        }
    }

    async fn read_cached(&self, key: &str) -> Option<Vec<CoffeeRecord>> {
        let bytes = match self.cache.get(MENU_NAMESPACE, key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                counter!(METRIC_CATALOG_CACHE_MISS).increment(1);
                return None;
            }
            Err(err) => {
                counter!(METRIC_CATALOG_CACHE_ERROR, "op" => "get").increment(1);
                counter!(METRIC_CATALOG_CACHE_MISS).increment(1);
                warn!(target = SOURCE, error = %err, "menu cache read failed");
                return None;
            }
        };

        match serde_json::from_slice::<Vec<CoffeeRecord>>(&bytes) {
            Ok(page) => {
                counter!(METRIC_CATALOG_CACHE_HIT).increment(1);
                debug!(target = SOURCE, key, "menu cache hit");
                Some(page)
            }
            Err(err) => {
                counter!(METRIC_CATALOG_CACHE_ERROR, "op" => "decode").increment(1);
                counter!(METRIC_CATALOG_CACHE_MISS).increment(1);
                warn!(target = SOURCE, key, error = %err, "discarding malformed menu cache entry");
                None
            }
        }
    }

    async fn write_cached(&self, key: &str, page: &[CoffeeRecord]) {
        let bytes = match serde_json::to_vec(page) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                counter!(METRIC_CATALOG_CACHE_ERROR, "op" => "encode").increment(1);
                warn!(target = SOURCE, error = %err, "failed to encode menu page");
                return;
            }
        };

        if let Err(err) = self.cache.put(MENU_NAMESPACE, key, bytes, self.ttl).await {
            counter!(METRIC_CATALOG_CACHE_ERROR, "op" => "put").increment(1);
            warn!(target = SOURCE, key, error = %err, "menu cache write failed");
        }
    }

    async fn invalidate_menu(&self) {
        counter!(METRIC_CATALOG_CACHE_INVALIDATE).increment(1);
        if let Err(err) = self.cache.invalidate(MENU_NAMESPACE).await {
            counter!(METRIC_CATALOG_CACHE_ERROR, "op" => "invalidate").increment(1);
            warn!(target = SOURCE, error = %err, "menu cache invalidation failed");
        }
    }
}

#[async_trait]
impl<Tx, S> CoffeeRepository<Tx> for CachedCoffeeRepository<S>
where
    Tx: Send + 'static,
    S: CoffeeStorage<Tx> + 'static,
{
    async fn create(&self, tx: &mut Tx, coffee: NewCoffee) -> Result<CoffeeRecord, RepoError> {
        let record = self.storage.insert_coffee(tx, &coffee).await?;
        self.invalidate_menu().await;
        Ok(record)
    }

    async fn get_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[i64],
    ) -> Result<HashMap<i64, CoffeeRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.storage.coffees_by_ids(tx, ids).await
    }

    async fn get_paginated(
        &self,
        tx: &mut Tx,
        query: CoffeePageQuery,
    ) -> Result<Vec<CoffeeRecord>, RepoError> {
        let key = menu_page_key(&query);
        if let Some(page) = self.read_cached(&key).await {
            return Ok(page);
        }

        let page = self.storage.list_coffees(tx, &query).await?;
        self.write_cached(&key, &page).await;
        Ok(page)
    }

    async fn update(&self, tx: &mut Tx, coffee: CoffeeRecord) -> Result<CoffeeRecord, RepoError> {
        let record = self.storage.update_coffee(tx, &coffee).await?;
        self.invalidate_menu().await;
        Ok(record)
    }

    async fn delete(&self, tx: &mut Tx, id: i64) -> Result<(), RepoError> {
        self.storage.soft_delete_coffee(tx, id).await?;
        self.invalidate_menu().await;
        Ok(())
    }

    async fn invalidate_cached_pages(&self) {
        self.invalidate_menu().await;
    }
}
