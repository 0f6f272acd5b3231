use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::{
    application::repos::{CoffeePageQuery, RepoError},
    application::storage::CoffeeStorage,
    domain::entities::{CoffeeRecord, NewCoffee},
};

use super::{PgTx, PostgresRepositories, map_sqlx_error};

const COFFEE_COLUMNS: &str = "id, name, price, description, in_stock, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CoffeeRow {
    id: i64,
    name: String,
    price: Decimal,
    description: String,
    in_stock: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CoffeeRow> for CoffeeRecord {
    fn from(row: CoffeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            in_stock: row.in_stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CoffeeStorage<PgTx> for PostgresRepositories {
    async fn insert_coffee(
        &self,
        tx: &mut PgTx,
        coffee: &NewCoffee,
    ) -> Result<CoffeeRecord, RepoError> {
        let row = sqlx::query_as::<_, CoffeeRow>(&format!(
            "INSERT INTO coffees (name, price, description, in_stock) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COFFEE_COLUMNS}"
        ))
        .bind(&coffee.name)
        .bind(coffee.price)
        .bind(&coffee.description)
        .bind(coffee.in_stock)
        .fetch_one(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn coffees_by_ids(
        &self,
        tx: &mut PgTx,
        ids: &[i64],
    ) -> Result<HashMap<i64, CoffeeRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CoffeeRow>(&format!(
            "SELECT {COFFEE_COLUMNS} FROM coffees \
             WHERE id = ANY($1) AND deleted_at IS NULL"
        ))
        .bind(ids)
        .fetch_all(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, CoffeeRecord::from(row)))
            .collect())
    }

    async fn list_coffees(
        &self,
        tx: &mut PgTx,
        query: &CoffeePageQuery,
    ) -> Result<Vec<CoffeeRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(COFFEE_COLUMNS);
        qb.push(" FROM coffees WHERE deleted_at IS NULL");
        if let Some(in_stock) = query.in_stock {
            qb.push(" AND in_stock = ");
            qb.push_bind(in_stock);
        }
        qb.push(" ORDER BY updated_at ASC, id ASC LIMIT ");
        qb.push_bind(query.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(query.page.offset());

        let rows = qb
            .build_query_as::<CoffeeRow>()
            .fetch_all(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CoffeeRecord::from).collect())
    }

    async fn update_coffee(
        &self,
        tx: &mut PgTx,
        coffee: &CoffeeRecord,
    ) -> Result<CoffeeRecord, RepoError> {
        let row = sqlx::query_as::<_, CoffeeRow>(&format!(
            "UPDATE coffees \
             SET name = $2, price = $3, description = $4, in_stock = $5, \
                 updated_at = clock_timestamp() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COFFEE_COLUMNS}"
        ))
        .bind(coffee.id)
        .bind(&coffee.name)
        .bind(coffee.price)
        .bind(&coffee.description)
        .bind(coffee.in_stock)
        .fetch_optional(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        row.map(CoffeeRecord::from).ok_or(RepoError::NotFound)
    }

    async fn soft_delete_coffee(&self, tx: &mut PgTx, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE coffees \
             SET deleted_at = clock_timestamp(), updated_at = clock_timestamp() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
