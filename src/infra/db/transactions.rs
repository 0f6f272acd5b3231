use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{RepoError, TransactionPageQuery},
    application::storage::TransactionStorage,
    domain::entities::{NewTransaction, PurchaseItemRecord, TransactionRecord},
};

use super::{PgTx, PostgresRepositories, map_sqlx_error};

const TRANSACTION_COLUMNS: &str = "id, user_id, total, amount_paid, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, transaction_id, coffee_id, price, type_option";

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    user_id: Uuid,
    total: Decimal,
    amount_paid: Decimal,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TransactionRow {
    fn into_record(self, items: Vec<PurchaseItemRecord>) -> TransactionRecord {
        TransactionRecord {
            id: self.id,
            user_id: self.user_id,
            total: self.total,
            amount_paid: self.amount_paid,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PurchaseItemRow {
    id: i64,
    transaction_id: i64,
    coffee_id: i64,
    price: Decimal,
    type_option: String,
}

impl From<PurchaseItemRow> for PurchaseItemRecord {
    fn from(row: PurchaseItemRow) -> Self {
        Self {
            id: row.id,
            transaction_id: row.transaction_id,
            coffee_id: row.coffee_id,
            price: row.price,
            type_option: row.type_option,
        }
    }
}

impl PostgresRepositories {
    /// Items for every listed transaction, grouped by owner and ordered by id.
    async fn items_for(
        tx: &mut PgTx,
        transaction_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<PurchaseItemRecord>>, RepoError> {
        let mut grouped: HashMap<i64, Vec<PurchaseItemRecord>> = HashMap::new();
        if transaction_ids.is_empty() {
            return Ok(grouped);
        }

        let rows = sqlx::query_as::<_, PurchaseItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM purchase_items \
             WHERE transaction_id = ANY($1) \
             ORDER BY id ASC"
        ))
        .bind(transaction_ids)
        .fetch_all(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        for row in rows {
            grouped
                .entry(row.transaction_id)
                .or_default()
                .push(row.into());
        }
        Ok(grouped)
    }

    async fn attach_items(
        tx: &mut PgTx,
        rows: Vec<TransactionRow>,
    ) -> Result<Vec<TransactionRecord>, RepoError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut items = Self::items_for(tx, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let owned = items.remove(&row.id).unwrap_or_default();
                row.into_record(owned)
            })
            .collect())
    }
}

#[async_trait]
impl TransactionStorage<PgTx> for PostgresRepositories {
    async fn insert_transaction(
        &self,
        tx: &mut PgTx,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, RepoError> {
        let header = sqlx::query_as::<_, TransactionRow>(&format!(
            "INSERT INTO transactions (user_id, total, amount_paid) \
             VALUES ($1, $2, $3) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(transaction.user_id)
        .bind(transaction.total)
        .bind(transaction.amount_paid)
        .fetch_one(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        if transaction.items.is_empty() {
            return Ok(header.into_record(Vec::new()));
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO purchase_items (transaction_id, coffee_id, price, type_option) ",
        );
        qb.push_values(&transaction.items, |mut row, item| {
            row.push_bind(header.id)
                .push_bind(item.coffee_id)
                .push_bind(item.price)
                .push_bind(&item.type_option);
        });
        qb.push(" RETURNING ");
        qb.push(ITEM_COLUMNS);

        let mut items: Vec<PurchaseItemRecord> = qb
            .build_query_as::<PurchaseItemRow>()
            .fetch_all(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(PurchaseItemRecord::from)
            .collect();
        items.sort_by_key(|item| item.id);

        Ok(header.into_record(items))
    }

    async fn transactions_by_ids(
        &self,
        tx: &mut PgTx,
        ids: &[i64],
    ) -> Result<HashMap<i64, TransactionRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        let records = Self::attach_items(tx, rows).await?;
        Ok(records
            .into_iter()
            .map(|record| (record.id, record))
            .collect())
    }

    async fn list_transactions(
        &self,
        tx: &mut PgTx,
        query: &TransactionPageQuery,
    ) -> Result<Vec<TransactionRecord>, RepoError> {
        let sort_key = query.sort_key.unwrap_or_default();
        let direction = query.sort_direction.unwrap_or_default();

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TRANSACTION_COLUMNS);
        qb.push(" FROM transactions WHERE TRUE");
        if let Some(user_id) = query.user_id {
            qb.push(" AND user_id = ");
            qb.push_bind(user_id);
        }
        // Both fragments come from closed enums, never from caller input.
        qb.push(" ORDER BY ");
        qb.push(sort_key.column());
        qb.push(" ");
        qb.push(direction.as_sql());
        qb.push(", id ");
        qb.push(direction.as_sql());
        qb.push(" LIMIT ");
        qb.push_bind(query.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(query.page.offset());

        let rows = qb
            .build_query_as::<TransactionRow>()
            .fetch_all(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?;

        Self::attach_items(tx, rows).await
    }

    async fn update_transaction(
        &self,
        tx: &mut PgTx,
        transaction: &TransactionRecord,
    ) -> Result<TransactionRecord, RepoError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "UPDATE transactions \
             SET amount_paid = $2, updated_at = clock_timestamp() \
             WHERE id = $1 \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(transaction.id)
        .bind(transaction.amount_paid)
        .fetch_optional(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        let mut records = Self::attach_items(tx, vec![row]).await?;
        records.pop().ok_or(RepoError::NotFound)
    }

    async fn delete_transaction(&self, tx: &mut PgTx, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
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
