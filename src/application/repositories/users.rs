use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, UserPageQuery, UserRepository};
use crate::application::storage::UserStorage;
use crate::domain::entities::{NewUser, UserRecord};

/// Uncached pass-through; login must never see a stale password hash.
///
/// Emails are compared in lowercase, matching how they are stored.
pub struct StoredUserRepository<S> {
    storage: Arc<S>,
}

impl<S> StoredUserRepository<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<Tx, S> UserRepository<Tx> for StoredUserRepository<S>
where
    Tx: Send + 'static,
    S: UserStorage<Tx> + 'static,
{
    async fn create(&self, tx: &mut Tx, mut user: NewUser) -> Result<UserRecord, RepoError> {
        user.email = user.email.to_lowercase();
        self.storage.insert_user(tx, &user).await
    }

    async fn get_by_email(&self, tx: &mut Tx, email: &str) -> Result<UserRecord, RepoError> {
        let email = email.trim().to_lowercase();
        self.storage.user_by_email(tx, &email).await
    }

    async fn get_by_ids(
        &self,
        tx: &mut Tx,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.storage.users_by_ids(tx, ids).await
    }

    async fn get_paginated(
        &self,
        tx: &mut Tx,
        query: UserPageQuery,
    ) -> Result<Vec<UserRecord>, RepoError> {
        self.storage.list_users(tx, &query).await
    }

    async fn update(&self, tx: &mut Tx, mut user: UserRecord) -> Result<UserRecord, RepoError> {
        user.email = user.email.to_lowercase();
        self.storage.update_user(tx, &user).await
    }

    async fn delete(&self, tx: &mut Tx, id: Uuid) -> Result<(), RepoError> {
        self.storage.delete_user(tx, id).await
    }
}
