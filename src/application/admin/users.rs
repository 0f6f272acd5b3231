use std::sync::Arc;

use crate::application::admin::{AdminError, require_admin};
use crate::application::pagination::PageRequest;
use crate::application::repos::{UserPageQuery, UserRepository};
use crate::application::repositories::RepositorySet;
use crate::application::uow::{UnitOfWork, settle};
use crate::domain::entities::UserRecord;
use crate::domain::types::UserRole;
use crate::domain::users::Actor;

pub struct AdminUserService<U: UnitOfWork> {
    uow: Arc<U>,
    users: Arc<dyn UserRepository<U::Tx>>,
    page_size: u32,
}

impl<U: UnitOfWork> AdminUserService<U> {
    pub fn new(uow: Arc<U>, repositories: &RepositorySet<U::Tx>, page_size: u32) -> Self {
        Self {
            uow,
            users: repositories.users.clone(),
            page_size,
        }
    }

    /// Registered users in sign-up order, optionally restricted to one role.
    pub async fn list(
        &self,
        actor: &Actor,
        page: Option<u32>,
        role: Option<UserRole>,
    ) -> Result<Vec<UserRecord>, AdminError> {
        require_admin(actor)?;
        let query = UserPageQuery {
            page: PageRequest::from_one_based(self.page_size, page)?,
            role,
        };

        let mut tx = self.uow.begin().await?;
        let result = self
            .users
            .get_paginated(&mut tx, query)
            .await
            .map_err(AdminError::from);
        settle(self.uow.as_ref(), tx, result).await
    }
}
