//! Domain entities mirrored from persistent storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::UserRole;

/// A catalog entry. Soft-deleted rows never surface as records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeRecord {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub in_stock: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoffee {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub in_stock: bool,
}

/// An order header together with its purchase items.
///
/// `total` is fixed at creation; only `amount_paid` changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub items: Vec<PurchaseItemRecord>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseItemRecord {
    pub id: i64,
    pub transaction_id: i64,
    pub coffee_id: i64,
    /// Price copied from the catalog when the order was placed.
    pub price: Decimal,
    pub type_option: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub items: Vec<NewPurchaseItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchaseItem {
    pub coffee_id: i64,
    pub price: Decimal,
    pub type_option: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
}
