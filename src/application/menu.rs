//! Public menu listing.

use std::sync::Arc;

use crate::application::pagination::PageRequest;
use crate::application::repos::{CoffeePageQuery, CoffeeRepository, RepoError};
use crate::application::repositories::RepositorySet;
use crate::application::uow::{UnitOfWork, settle};
use crate::domain::entities::CoffeeRecord;

pub struct MenuService<U: UnitOfWork> {
    uow: Arc<U>,
    coffees: Arc<dyn CoffeeRepository<U::Tx>>,
    page_size: u32,
}

impl<U: UnitOfWork> MenuService<U> {
    pub fn new(uow: Arc<U>, repositories: &RepositorySet<U::Tx>, page_size: u32) -> Self {
        Self {
            uow,
            coffees: repositories.coffees.clone(),
            page_size,
        }
    }

    /// One page of live coffees; `page` is 1-based and defaults to the first page.
    pub async fn list(
        &self,
        page: Option<u32>,
        in_stock: Option<bool>,
    ) -> Result<Vec<CoffeeRecord>, RepoError> {
        let query = CoffeePageQuery {
            page: PageRequest::from_one_based(self.page_size, page)?,
            in_stock,
        };

        let mut tx = self.uow.begin().await?;
        let result = self.coffees.get_paginated(&mut tx, query).await;
        settle(self.uow.as_ref(), tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::application::testing::InMemoryDatabase;
    use crate::cache::NoopStore;

    use super::*;

    fn service(db: &Arc<InMemoryDatabase>, page_size: u32) -> MenuService<InMemoryDatabase> {
        let repositories =
            RepositorySet::new(db.clone(), Arc::new(NoopStore), Duration::from_secs(60));
        MenuService::new(db.clone(), &repositories, page_size)
    }

    #[tokio::test]
    async fn pages_are_one_based_for_callers() {
        let db = Arc::new(InMemoryDatabase::new());
        let first = db.seed_coffee("Espresso", 300);
        let second = db.seed_coffee("Latte", 450);
        let menu = service(&db, 1);

        let page_one = menu.list(Some(1), None).await.expect("page one");
        let page_two = menu.list(Some(2), None).await.expect("page two");
        let default_page = menu.list(None, None).await.expect("default page");

        assert_eq!(page_one, vec![first.clone()]);
        assert_eq!(page_two, vec![second]);
        assert_eq!(default_page, vec![first]);
        assert!(menu.list(Some(3), None).await.expect("past the end").is_empty());
        assert_eq!(db.commits(), 4);
    }

    #[tokio::test]
    async fn invalid_page_size_never_reaches_storage() {
        let db = Arc::new(InMemoryDatabase::new());
        let menu = service(&db, 0);

        let err = menu.list(None, None).await.expect_err("invalid page size");
        assert!(err.is_client_error());
        assert_eq!(db.begins(), 0);
        assert_eq!(db.storage_calls(), 0);
    }
}
