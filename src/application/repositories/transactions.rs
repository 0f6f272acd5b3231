use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::application::repos::{RepoError, TransactionPageQuery, TransactionsRepository};
use crate::application::storage::TransactionStorage;
use crate::domain::entities::{NewTransaction, TransactionRecord};

/// Uncached pass-through: order data must always be read fresh.
pub struct StoredTransactionsRepository<S> {
    storage: Arc<S>,
}

impl<S> StoredTransactionsRepository<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<Tx, S> TransactionsRepository<Tx> for StoredTransactionsRepository<S>
where
    Tx: Send + 'static,
    S: TransactionStorage<Tx> + 'static,
{
    async fn create(
        &self,
        tx: &mut Tx,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, RepoError> {
        self.storage.insert_transaction(tx, &transaction).await
    }

    async fn get_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[i64],
    ) -> Result<HashMap<i64, TransactionRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.storage.transactions_by_ids(tx, ids).await
    }

    async fn get_paginated(
        &self,
        tx: &mut Tx,
        query: TransactionPageQuery,
    ) -> Result<Vec<TransactionRecord>, RepoError> {
        self.storage.list_transactions(tx, &query).await
    }

    async fn update(
        &self,
        tx: &mut Tx,
        transaction: TransactionRecord,
    ) -> Result<TransactionRecord, RepoError> {
        self.storage.update_transaction(tx, &transaction).await
    }

    async fn delete(&self, tx: &mut Tx, id: i64) -> Result<(), RepoError> {
        self.storage.delete_transaction(tx, id).await
    }
}
