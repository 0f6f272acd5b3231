//! Postgres-backed storage implementations.

mod coffees;
mod transactions;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    Postgres, Transaction,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::RepoError;
use crate::application::uow::UnitOfWork;

/// Transaction handle threaded through every storage call.
pub type PgTx = Transaction<'static, Postgres>;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }
}

#[async_trait]
impl UnitOfWork for PostgresRepositories {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, RepoError> {
        self.pool.begin().await.map_err(map_sqlx_error)
    }

    async fn commit(&self, tx: PgTx) -> Result<(), RepoError> {
        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(&self, tx: PgTx) -> Result<(), RepoError> {
        tx.rollback().await.map_err(map_sqlx_error)
    }
}
