//! Repository traits: the contract request handlers and services depend on.
//!
//! Every method takes the caller's open transaction handle. Repositories never
//! begin, commit or roll back on their own.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PaginationError};
use crate::domain::entities::{
    CoffeeRecord, NewCoffee, NewTransaction, NewUser, TransactionRecord, UserRecord,
};
use crate::domain::types::{SortDirection, TransactionSortKey, UserRole};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("constraint `{constraint}` violated")]
    ConstraintViolation { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
    #[error("database timeout")]
    Timeout,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// True for failures caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RepoError::ConstraintViolation { .. }
                | RepoError::NotFound
                | RepoError::InvalidRequest { .. }
                | RepoError::Pagination(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoffeePageQuery {
    pub page: PageRequest,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionPageQuery {
    pub page: PageRequest,
    pub user_id: Option<Uuid>,
    pub sort_key: Option<TransactionSortKey>,
    pub sort_direction: Option<SortDirection>,
}

impl TransactionPageQuery {
    /// Newest-first listing for a single customer.
    pub fn for_user(user_id: Uuid, page: PageRequest) -> Self {
        Self {
            page,
            user_id: Some(user_id),
            sort_key: None,
            sort_direction: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPageQuery {
    pub page: PageRequest,
    pub role: Option<UserRole>,
}

#[async_trait]
pub trait CoffeeRepository<Tx: Send>: Send + Sync {
    async fn create(&self, tx: &mut Tx, coffee: NewCoffee) -> Result<CoffeeRecord, RepoError>;

    /// Ids without a live coffee are absent from the map.
    async fn get_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[i64],
    ) -> Result<HashMap<i64, CoffeeRecord>, RepoError>;

    async fn get_paginated(
        &self,
        tx: &mut Tx,
        query: CoffeePageQuery,
    ) -> Result<Vec<CoffeeRecord>, RepoError>;

    async fn update(&self, tx: &mut Tx, coffee: CoffeeRecord) -> Result<CoffeeRecord, RepoError>;

    async fn delete(&self, tx: &mut Tx, id: i64) -> Result<(), RepoError>;

    /// Drop every cached menu page outside any transaction.
    ///
    /// Writers call this after commit: a page cached from pre-commit rows
    /// between the in-transaction invalidation and the commit must not survive.
    async fn invalidate_cached_pages(&self);
}

#[async_trait]
pub trait TransactionsRepository<Tx: Send>: Send + Sync {
    async fn create(
        &self,
        tx: &mut Tx,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, RepoError>;

    async fn get_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[i64],
    ) -> Result<HashMap<i64, TransactionRecord>, RepoError>;

    async fn get_paginated(
        &self,
        tx: &mut Tx,
        query: TransactionPageQuery,
    ) -> Result<Vec<TransactionRecord>, RepoError>;

    /// Persists `amount_paid`; totals and items are immutable after creation.
    async fn update(
        &self,
        tx: &mut Tx,
        transaction: TransactionRecord,
    ) -> Result<TransactionRecord, RepoError>;

    async fn delete(&self, tx: &mut Tx, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UserRepository<Tx: Send>: Send + Sync {
    async fn create(&self, tx: &mut Tx, user: NewUser) -> Result<UserRecord, RepoError>;

    async fn get_by_email(&self, tx: &mut Tx, email: &str) -> Result<UserRecord, RepoError>;

    async fn get_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserRecord>, RepoError>;

    async fn get_paginated(
        &self,
        tx: &mut Tx,
        query: UserPageQuery,
    ) -> Result<Vec<UserRecord>, RepoError>;

    async fn update(&self, tx: &mut Tx, user: UserRecord) -> Result<UserRecord, RepoError>;

    async fn delete(&self, tx: &mut Tx, id: Uuid) -> Result<(), RepoError>;
}
