use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dollar_coffee::application::pagination::PageRequest;
use dollar_coffee::application::repos::{CoffeePageQuery, CoffeeRepository};
use dollar_coffee::application::repositories::CachedCoffeeRepository;
use dollar_coffee::application::uow::UnitOfWork;
use dollar_coffee::cache::{CacheError, CacheStore, MemoryStore};
use dollar_coffee::domain::entities::NewCoffee;
use dollar_coffee::infra::db::PostgresRepositories;
use metrics_util::debugging::DebuggingRecorder;
use rust_decimal::Decimal;
use sqlx::PgPool;

struct BrokenStore;

#[async_trait]
impl CacheStore for BrokenStore {
    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn put(
        &self,
        _namespace: &str,
        _key: &str,
        _value: Bytes,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn invalidate(&self, _namespace: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

fn menu_query() -> CoffeePageQuery {
    CoffeePageQuery {
        page: PageRequest::new(10, 0).expect("valid page"),
        in_stock: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn catalog_cache_paths_emit_expected_metric_keys(pool: PgPool) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let repos = Arc::new(PostgresRepositories::new(pool));
    let memory: Arc<dyn CacheStore> = Arc::new(MemoryStore::new(
        NonZeroUsize::new(8).expect("non-zero limit"),
    ));
    let cached = CachedCoffeeRepository::new(repos.clone(), memory, Duration::from_secs(60));

    let mut tx = repos.begin().await.expect("begin");
    cached
        .create(
            &mut tx,
            NewCoffee {
                name: "Cortado".to_string(),
                price: Decimal::new(325, 2),
                description: "Equal parts espresso and milk".to_string(),
                in_stock: true,
            },
        )
        .await
        .expect("create coffee");

    // miss, then hit
    for _ in 0..2 {
        let page = cached
            .get_paginated(&mut tx, menu_query())
            .await
            .expect("menu page");
        assert_eq!(page.len(), 1);
    }

    // an unreachable store still answers from storage
    let broken = CachedCoffeeRepository::new(
        repos.clone(),
        Arc::new(BrokenStore),
        Duration::from_secs(60),
    );
    let page = broken
        .get_paginated(&mut tx, menu_query())
        .await
        .expect("menu page without cache");
    assert_eq!(page.len(), 1);
    repos.commit(tx).await.expect("commit");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "dollar_coffee_catalog_cache_hit_total",
        "dollar_coffee_catalog_cache_miss_total",
        "dollar_coffee_catalog_cache_error_total",
        "dollar_coffee_catalog_cache_invalidate_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
