//! Shared domain enumerations aligned with persisted database enums.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(DomainError::validation(format!("unknown role `{other}`"))),
        }
    }
}

/// Columns a transaction listing may be ordered by.
///
/// The set is closed so that no caller-provided text ever reaches the SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Total,
    AmountPaid,
}

impl TransactionSortKey {
    pub fn column(self) -> &'static str {
        match self {
            TransactionSortKey::CreatedAt => "created_at",
            TransactionSortKey::UpdatedAt => "updated_at",
            TransactionSortKey::Total => "total",
            TransactionSortKey::AmountPaid => "amount_paid",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<UserRole>().expect("admin"), UserRole::Admin);
        assert_eq!(" user ".parse::<UserRole>().expect("user"), UserRole::User);
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn sort_keys_map_to_fixed_columns() {
        assert_eq!(TransactionSortKey::default().column(), "created_at");
        assert_eq!(TransactionSortKey::AmountPaid.column(), "amount_paid");
        assert_eq!(SortDirection::default().as_sql(), "DESC");
    }
}
