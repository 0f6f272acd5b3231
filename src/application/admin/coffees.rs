use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::application::admin::{AdminError, require_admin};
use crate::application::repos::CoffeeRepository;
use crate::application::repositories::RepositorySet;
use crate::application::uow::{UnitOfWork, settle};
use crate::domain::entities::{CoffeeRecord, NewCoffee};
use crate::domain::users::Actor;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct CreateCoffeeCommand {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub in_stock: bool,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateCoffeeCommand {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub in_stock: Option<bool>,
}

fn validate_name(name: &str) -> Result<String, AdminError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::invalid("coffee name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AdminError::invalid("coffee name is too long"));
    }
    Ok(name.to_string())
}

fn validate_price(price: Decimal) -> Result<Decimal, AdminError> {
    if price <= Decimal::ZERO {
        return Err(AdminError::invalid("price must be greater than zero"));
    }
    if price != price.round_dp(2) {
        return Err(AdminError::invalid("price supports at most two decimal places"));
    }
    Ok(price)
}

pub struct AdminCoffeeService<U: UnitOfWork> {
    uow: Arc<U>,
    coffees: Arc<dyn CoffeeRepository<U::Tx>>,
}

impl<U: UnitOfWork> AdminCoffeeService<U> {
    pub fn new(uow: Arc<U>, repositories: &RepositorySet<U::Tx>) -> Self {
        Self {
            uow,
            coffees: repositories.coffees.clone(),
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        command: CreateCoffeeCommand,
    ) -> Result<CoffeeRecord, AdminError> {
        require_admin(actor)?;
        let coffee = NewCoffee {
            name: validate_name(&command.name)?,
            price: validate_price(command.price)?,
            description: command.description.trim().to_string(),
            in_stock: command.in_stock,
        };

        let mut tx = self.uow.begin().await?;
        let result = self.coffees.create(&mut tx, coffee).await.map_err(AdminError::from);
        let created = settle(self.uow.as_ref(), tx, result).await?;
        self.coffees.invalidate_cached_pages().await;
        info!(coffee_id = created.id, name = %created.name, "coffee created");
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        command: UpdateCoffeeCommand,
    ) -> Result<CoffeeRecord, AdminError> {
        require_admin(actor)?;
        let name = command.name.as_deref().map(validate_name).transpose()?;
        let price = command.price.map(validate_price).transpose()?;

        let mut tx = self.uow.begin().await?;
        let result: Result<CoffeeRecord, AdminError> = async {
            let mut current = self
                .coffees
                .get_by_ids(&mut tx, &[id])
                .await?
                .remove(&id)
                .ok_or(AdminError::NotFound { entity: "coffee" })?;

            if let Some(name) = name {
                current.name = name;
            }
            if let Some(price) = price {
                current.price = price;
            }
            if let Some(description) = command.description {
                current.description = description.trim().to_string();
            }
            if let Some(in_stock) = command.in_stock {
                current.in_stock = in_stock;
            }

            self.coffees
                .update(&mut tx, current)
                .await
                .map_err(AdminError::missing("coffee"))
        }
        .await;
        let updated = settle(self.uow.as_ref(), tx, result).await?;
        self.coffees.invalidate_cached_pages().await;
        info!(coffee_id = updated.id, "coffee updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), AdminError> {
        require_admin(actor)?;

        let mut tx = self.uow.begin().await?;
        let result = self
            .coffees
            .delete(&mut tx, id)
            .await
            .map_err(AdminError::missing("coffee"));
        settle(self.uow.as_ref(), tx, result).await?;
        self.coffees.invalidate_cached_pages().await;
        info!(coffee_id = id, "coffee deleted");
        Ok(())
    }
}
