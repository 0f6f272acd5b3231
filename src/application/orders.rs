//! Order placement and purchase history.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::pagination::{PageRequest, PaginationError};
use crate::application::repos::{
    CoffeeRepository, RepoError, TransactionPageQuery, TransactionsRepository,
};
use crate::application::repositories::RepositorySet;
use crate::application::uow::{UnitOfWork, settle};
use crate::domain::entities::TransactionRecord;
use crate::domain::orders::{OrderLine, PricingError, price_order, requested_coffee_ids};
use crate::domain::users::Actor;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("coffee {coffee_id} does not exist")]
    InvalidCoffee { coffee_id: i64 },
    #[error("purchases of other users are not accessible")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<PricingError> for OrderError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::UnknownCoffee { coffee_id } => OrderError::InvalidCoffee { coffee_id },
            other @ (PricingError::EmptyOrder | PricingError::TotalOverflow) => {
                OrderError::InvalidRequest(other.to_string())
            }
        }
    }
}

impl From<PaginationError> for OrderError {
    fn from(err: PaginationError) -> Self {
        OrderError::InvalidRequest(err.to_string())
    }
}

/// Outcome of a committed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub transaction_id: i64,
    pub total: Decimal,
    pub item_count: usize,
}

pub struct OrderService<U: UnitOfWork> {
    uow: Arc<U>,
    coffees: Arc<dyn CoffeeRepository<U::Tx>>,
    transactions: Arc<dyn TransactionsRepository<U::Tx>>,
    page_size: u32,
}

impl<U: UnitOfWork> OrderService<U> {
    pub fn new(uow: Arc<U>, repositories: &RepositorySet<U::Tx>, page_size: u32) -> Self {
        Self {
            uow,
            coffees: repositories.coffees.clone(),
            transactions: repositories.transactions.clone(),
            page_size,
        }
    }

    /// Price `lines` against the current catalog and persist the order atomically.
    ///
    /// An empty order is rejected before a transaction is opened. Any unknown
    /// coffee or storage failure rolls back the whole order.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn place_order(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
    ) -> Result<PlacedOrder, OrderError> {
        if lines.is_empty() {
            return Err(PricingError::EmptyOrder.into());
        }
        let coffee_ids = requested_coffee_ids(&lines);

        let mut tx = self.uow.begin().await?;
        let result = self
            .price_and_persist(&mut tx, user_id, &lines, &coffee_ids)
            .await;
        let placed = settle(self.uow.as_ref(), tx, result).await?;

        info!(
            transaction_id = placed.transaction_id,
            total = %placed.total,
            item_count = placed.item_count,
            "order placed"
        );
        Ok(placed)
    }

    async fn price_and_persist(
        &self,
        tx: &mut U::Tx,
        user_id: Uuid,
        lines: &[OrderLine],
        coffee_ids: &[i64],
    ) -> Result<PlacedOrder, OrderError> {
        let catalog = self.coffees.get_by_ids(tx, coffee_ids).await?;
        let order = price_order(user_id, lines, &catalog)?;
        let record = self.transactions.create(tx, order).await?;

        Ok(PlacedOrder {
            transaction_id: record.id,
            total: record.total,
            item_count: record.items.len(),
        })
    }

    /// A user's orders, newest first. Only admins may read someone else's history.
    pub async fn history(
        &self,
        actor: &Actor,
        user_id: Uuid,
        page: Option<u32>,
    ) -> Result<Vec<TransactionRecord>, OrderError> {
        if !actor.can_access_user(user_id) {
            return Err(OrderError::Forbidden);
        }
        let page = PageRequest::from_one_based(self.page_size, page)?;
        let query = TransactionPageQuery::for_user(user_id, page);

        let mut tx = self.uow.begin().await?;
        let result = self
            .transactions
            .get_paginated(&mut tx, query)
            .await
            .map_err(OrderError::from);
        settle(self.uow.as_ref(), tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::application::testing::InMemoryDatabase;
    use crate::cache::NoopStore;
    use crate::domain::types::UserRole;

    use super::*;

    struct Fixture {
        db: Arc<InMemoryDatabase>,
        repositories: RepositorySet<crate::application::testing::MemoryTx>,
        orders: OrderService<InMemoryDatabase>,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(InMemoryDatabase::new());
        let repositories =
            RepositorySet::new(db.clone(), Arc::new(NoopStore), Duration::from_secs(60));
        let orders = OrderService::new(db.clone(), &repositories, 10);
        Fixture {
            db,
            repositories,
            orders,
        }
    }

    #[tokio::test]
    async fn order_total_is_the_sum_of_snapshotted_prices() {
        let fx = fixture();
        let customer = fx.db.seed_user("customer@example.com", UserRole::User);
        let a = fx.db.seed_coffee("A", 300);
        let b = fx.db.seed_coffee("B", 450);

        let placed = fx
            .orders
            .place_order(
                customer.id,
                vec![
                    OrderLine::new(a.id, "oat milk"),
                    OrderLine::new(a.id, ""),
                    OrderLine::new(b.id, "extra shot"),
                ],
            )
            .await
            .expect("order placed");

        assert_eq!(placed.total, Decimal::new(1050, 2));
        assert_eq!(placed.item_count, 3);

        let stored = fx
            .db
            .committed_transaction(placed.transaction_id)
            .expect("transaction persisted");
        assert_eq!(stored.user_id, customer.id);
        assert_eq!(stored.total, Decimal::new(1050, 2));
        assert_eq!(stored.amount_paid, Decimal::ZERO);
        let for_a: Vec<_> = stored.items.iter().filter(|item| item.coffee_id == a.id).collect();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|item| item.price == a.price));
        assert_eq!(
            stored.items.iter().filter(|item| item.coffee_id == b.id).count(),
            1
        );
        assert_eq!(fx.db.commits(), 1);
    }

    #[tokio::test]
    async fn later_price_changes_do_not_touch_history() {
        let fx = fixture();
        let customer = fx.db.seed_user("history@example.com", UserRole::User);
        let a = fx.db.seed_coffee("A", 300);

        let placed = fx
            .orders
            .place_order(customer.id, vec![OrderLine::new(a.id, "")])
            .await
            .expect("order placed");

        let mut tx = fx.db.begin().await.expect("begin");
        fx.repositories
            .coffees
            .update(
                &mut tx,
                crate::domain::entities::CoffeeRecord {
                    price: Decimal::new(999, 2),
                    ..a.clone()
                },
            )
            .await
            .expect("reprice");
        fx.db.commit(tx).await.expect("commit");

        let stored = fx
            .db
            .committed_transaction(placed.transaction_id)
            .expect("transaction persisted");
        assert_eq!(stored.total, Decimal::new(300, 2));
        assert_eq!(stored.items[0].price, Decimal::new(300, 2));
    }

    #[tokio::test]
    async fn deleted_coffee_fails_the_order_and_writes_nothing() {
        let fx = fixture();
        let customer = fx.db.seed_user("late@example.com", UserRole::User);
        let a = fx.db.seed_coffee("A", 300);

        let mut tx = fx.db.begin().await.expect("begin");
        fx.repositories.coffees.delete(&mut tx, a.id).await.expect("delete");
        fx.db.commit(tx).await.expect("commit");

        let err = fx
            .orders
            .place_order(customer.id, vec![OrderLine::new(a.id, "")])
            .await
            .expect_err("deleted coffee");

        assert!(matches!(err, OrderError::InvalidCoffee { coffee_id } if coffee_id == a.id));
        assert_eq!(fx.db.transaction_count(), 0);
        assert_eq!(fx.db.purchase_item_count(), 0);
        assert_eq!(fx.db.rollbacks(), 1);
    }

    #[tokio::test]
    async fn one_unknown_coffee_rejects_the_whole_order() {
        let fx = fixture();
        let customer = fx.db.seed_user("typo@example.com", UserRole::User);
        let a = fx.db.seed_coffee("A", 300);

        let err = fx
            .orders
            .place_order(
                customer.id,
                vec![OrderLine::new(a.id, ""), OrderLine::new(4242, "")],
            )
            .await
            .expect_err("unknown coffee");

        assert!(matches!(err, OrderError::InvalidCoffee { coffee_id: 4242 }));
        assert_eq!(fx.db.transaction_count(), 0);
        assert_eq!(fx.db.purchase_item_count(), 0);
    }

    #[tokio::test]
    async fn empty_order_never_touches_storage() {
        let fx = fixture();

        let err = fx
            .orders
            .place_order(Uuid::new_v4(), Vec::new())
            .await
            .expect_err("empty order");

        assert!(matches!(err, OrderError::InvalidRequest(_)));
        assert_eq!(fx.db.begins(), 0);
        assert_eq!(fx.db.storage_calls(), 0);
    }

    #[tokio::test]
    async fn storage_failure_rolls_back_and_propagates() {
        let fx = fixture();
        let customer = fx.db.seed_user("unlucky@example.com", UserRole::User);
        let a = fx.db.seed_coffee("A", 300);
        fx.db.fail_transaction_inserts(true);

        let err = fx
            .orders
            .place_order(customer.id, vec![OrderLine::new(a.id, "")])
            .await
            .expect_err("insert failure");

        assert!(matches!(err, OrderError::Repo(RepoError::Persistence(_))));
        assert_eq!(fx.db.rollbacks(), 1);
        assert_eq!(fx.db.commits(), 0);
        assert_eq!(fx.db.transaction_count(), 0);
    }

    #[tokio::test]
    async fn history_is_private_to_owner_and_admins() {
        let fx = fixture();
        let owner = fx.db.seed_user("owner@example.com", UserRole::User);
        let other = fx.db.seed_user("other@example.com", UserRole::User);
        let admin = fx.db.seed_user("admin@example.com", UserRole::Admin);
        let a = fx.db.seed_coffee("A", 300);

        let first = fx
            .orders
            .place_order(owner.id, vec![OrderLine::new(a.id, "")])
            .await
            .expect("first order");
        let second = fx
            .orders
            .place_order(owner.id, vec![OrderLine::new(a.id, "decaf")])
            .await
            .expect("second order");

        let own = fx
            .orders
            .history(&Actor::new(owner.id, owner.role), owner.id, None)
            .await
            .expect("own history");
        let ids: Vec<i64> = own.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.transaction_id, first.transaction_id]);

        let as_admin = fx
            .orders
            .history(&Actor::new(admin.id, admin.role), owner.id, Some(1))
            .await
            .expect("admin view");
        assert_eq!(as_admin.len(), 2);

        let err = fx
            .orders
            .history(&Actor::new(other.id, other.role), owner.id, None)
            .await
            .expect_err("foreign history");
        assert!(matches!(err, OrderError::Forbidden));
    }
}
