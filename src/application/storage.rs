//! Storage access traits implemented by persistence adapters.
//!
//! Each call runs inside the transaction handle it is given and never opens
//! one of its own.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{
    CoffeePageQuery, RepoError, TransactionPageQuery, UserPageQuery,
};
use crate::domain::entities::{
    CoffeeRecord, NewCoffee, NewTransaction, NewUser, TransactionRecord, UserRecord,
};

#[async_trait]
pub trait CoffeeStorage<Tx: Send>: Send + Sync {
    async fn insert_coffee(&self, tx: &mut Tx, coffee: &NewCoffee)
    -> Result<CoffeeRecord, RepoError>;

    async fn coffees_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[i64],
    ) -> Result<HashMap<i64, CoffeeRecord>, RepoError>;

    /// Live coffees ordered by `updated_at ASC, id ASC`.
    async fn list_coffees(
        &self,
        tx: &mut Tx,
        query: &CoffeePageQuery,
    ) -> Result<Vec<CoffeeRecord>, RepoError>;

    async fn update_coffee(
        &self,
        tx: &mut Tx,
        coffee: &CoffeeRecord,
    ) -> Result<CoffeeRecord, RepoError>;

    async fn soft_delete_coffee(&self, tx: &mut Tx, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait TransactionStorage<Tx: Send>: Send + Sync {
    async fn insert_transaction(
        &self,
        tx: &mut Tx,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, RepoError>;

    async fn transactions_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[i64],
    ) -> Result<HashMap<i64, TransactionRecord>, RepoError>;

    async fn list_transactions(
        &self,
        tx: &mut Tx,
        query: &TransactionPageQuery,
    ) -> Result<Vec<TransactionRecord>, RepoError>;

    async fn update_transaction(
        &self,
        tx: &mut Tx,
        transaction: &TransactionRecord,
    ) -> Result<TransactionRecord, RepoError>;

    async fn delete_transaction(&self, tx: &mut Tx, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UserStorage<Tx: Send>: Send + Sync {
    async fn insert_user(&self, tx: &mut Tx, user: &NewUser) -> Result<UserRecord, RepoError>;

    async fn user_by_email(&self, tx: &mut Tx, email: &str) -> Result<UserRecord, RepoError>;

    async fn users_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserRecord>, RepoError>;

    /// Users in insertion order (`created_at ASC, id ASC`).
    async fn list_users(
        &self,
        tx: &mut Tx,
        query: &UserPageQuery,
    ) -> Result<Vec<UserRecord>, RepoError>;

    async fn update_user(&self, tx: &mut Tx, user: &UserRecord) -> Result<UserRecord, RepoError>;

    async fn delete_user(&self, tx: &mut Tx, id: Uuid) -> Result<(), RepoError>;
}
