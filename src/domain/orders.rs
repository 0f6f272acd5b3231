//! Order pricing against a snapshot of the catalog.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::entities::{CoffeeRecord, NewPurchaseItem, NewTransaction};

/// One requested line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub coffee_id: i64,
    pub type_option: String,
}

impl OrderLine {
    pub fn new(coffee_id: i64, type_option: impl Into<String>) -> Self {
        Self {
            coffee_id,
            type_option: type_option.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("order must contain at least one item")]
    EmptyOrder,
    #[error("coffee {coffee_id} is not available")]
    UnknownCoffee { coffee_id: i64 },
    #[error("order total exceeds the supported range")]
    TotalOverflow,
}

/// Distinct coffee ids referenced by `lines`, in ascending order.
pub fn requested_coffee_ids(lines: &[OrderLine]) -> Vec<i64> {
    lines
        .iter()
        .map(|line| line.coffee_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Price every line from `catalog` and build the transaction to persist.
///
/// Fails as a whole when any line references a coffee missing from `catalog`;
/// no partially priced order is ever produced. `amount_paid` always starts at zero.
pub fn price_order(
    user_id: Uuid,
    lines: &[OrderLine],
    catalog: &HashMap<i64, CoffeeRecord>,
) -> Result<NewTransaction, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyOrder);
    }

    let mut total = Decimal::ZERO;
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let coffee = catalog
            .get(&line.coffee_id)
            .ok_or(PricingError::UnknownCoffee {
                coffee_id: line.coffee_id,
            })?;

        total = total
            .checked_add(coffee.price)
            .ok_or(PricingError::TotalOverflow)?;
        items.push(NewPurchaseItem {
            coffee_id: coffee.id,
            price: coffee.price,
            type_option: line.type_option.clone(),
        });
    }

    Ok(NewTransaction {
        user_id,
        total,
        amount_paid: Decimal::ZERO,
        items,
    })
}
