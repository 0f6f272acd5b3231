//! Redis cache backend.
//!
//! A namespace maps to one hash: pages are fields, and the hash carries the
//! expiry so that a single `DEL` drops every page.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use deadpool_redis::{
    Config, Connection, Pool, Runtime,
    redis::{self, AsyncCommands},
};

use super::store::{CacheError, CacheStore};

pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Build a connection pool. Connections are opened lazily on first use.
    pub fn connect(url: &str) -> Result<Self, CacheError> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(CacheError::unavailable)?;
        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(CacheError::unavailable)
    }
}

fn ttl_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1)
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .hget(namespace, key)
            .await
            .map_err(CacheError::command)?;
        Ok(value.map(Bytes::from))
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        value: Bytes,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset(namespace, key, value.as_ref())
            .ignore()
            .expire(namespace, ttl_seconds(ttl))
            .ignore();
        let _: () = pipe
            .query_async(&mut *conn)
            .await
            .map_err(CacheError::command)?;
        Ok(())
    }

    async fn invalidate(&self, namespace: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(namespace).await.map_err(CacheError::command)?;
        Ok(())
    }
}
