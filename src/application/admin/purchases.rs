use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::application::admin::{AdminError, require_admin};
use crate::application::repos::TransactionsRepository;
use crate::application::repositories::RepositorySet;
use crate::application::uow::{UnitOfWork, settle};
use crate::domain::entities::TransactionRecord;
use crate::domain::users::Actor;

pub struct AdminPurchaseService<U: UnitOfWork> {
    uow: Arc<U>,
    transactions: Arc<dyn TransactionsRepository<U::Tx>>,
}

impl<U: UnitOfWork> AdminPurchaseService<U> {
    pub fn new(uow: Arc<U>, repositories: &RepositorySet<U::Tx>) -> Self {
        Self {
            uow,
            transactions: repositories.transactions.clone(),
        }
    }

    /// Record how much the customer has paid. The order total never changes.
    pub async fn set_amount_paid(
        &self,
        actor: &Actor,
        id: i64,
        amount_paid: Decimal,
    ) -> Result<TransactionRecord, AdminError> {
        require_admin(actor)?;
        if amount_paid < Decimal::ZERO {
            return Err(AdminError::invalid("amount paid must not be negative"));
        }

        let mut tx = self.uow.begin().await?;
        let result: Result<TransactionRecord, AdminError> = async {
            let mut current = self
                .transactions
                .get_by_ids(&mut tx, &[id])
                .await?
                .remove(&id)
                .ok_or(AdminError::NotFound { entity: "purchase" })?;
            current.amount_paid = amount_paid;
            self.transactions
                .update(&mut tx, current)
                .await
                .map_err(AdminError::missing("purchase"))
        }
        .await;
        let updated = settle(self.uow.as_ref(), tx, result).await?;
        info!(
            transaction_id = updated.id,
            amount_paid = %updated.amount_paid,
            "purchase payment recorded"
        );
        Ok(updated)
    }
}
