//! Request handlers grouped by route prefix.

mod auth;
mod health;
mod internal;
mod menu;
mod purchases;

pub use auth::*;
pub use health::*;
pub use internal::*;
pub use menu::*;
pub use purchases::*;

use dollar_coffee_api_types::{CoffeeView, PurchaseHistoryEntry, PurchaseItemView, UserView};

use crate::domain::entities::{CoffeeRecord, TransactionRecord, UserRecord};

/// Lenient 1-based page parameter: anything unparsable means the first page.
fn parse_page(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse().ok())
}

fn coffee_view(coffee: CoffeeRecord) -> CoffeeView {
    CoffeeView {
        id: coffee.id,
        name: coffee.name,
        description: coffee.description,
        price: coffee.price,
        in_stock: coffee.in_stock,
    }
}

fn purchase_entry(transaction: TransactionRecord) -> PurchaseHistoryEntry {
    PurchaseHistoryEntry {
        transaction_id: transaction.id,
        amount_paid: transaction.amount_paid,
        total: transaction.total,
        purchase_date: transaction.created_at,
        items: transaction
            .items
            .into_iter()
            .map(|item| PurchaseItemView {
                coffee_id: item.coffee_id,
                price: item.price,
                options: item.type_option,
            })
            .collect(),
    }
}

fn user_view(user: UserRecord) -> UserView {
    UserView {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        phone_number: user.phone_number,
        role: user.role.as_str().to_string(),
    }
}
