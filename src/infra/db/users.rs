use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{RepoError, UserPageQuery},
    application::storage::UserStorage,
    domain::entities::{NewUser, UserRecord},
    domain::types::UserRole,
};

use super::{PgTx, PostgresRepositories, map_sqlx_error};

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone_number, password_hash, \
                            role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    password_hash: String,
    role: UserRole,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserStorage<PgTx> for PostgresRepositories {
    async fn insert_user(&self, tx: &mut PgTx, user: &NewUser) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users \
                 (id, first_name, last_name, email, phone_number, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.phone_number.as_deref())
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn user_by_email(&self, tx: &mut PgTx, email: &str) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRecord::from).ok_or(RepoError::NotFound)
    }

    async fn users_by_ids(
        &self,
        tx: &mut PgTx,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, UserRecord::from(row)))
            .collect())
    }

    async fn list_users(
        &self,
        tx: &mut PgTx,
        query: &UserPageQuery,
    ) -> Result<Vec<UserRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(USER_COLUMNS);
        qb.push(" FROM users WHERE TRUE");
        if let Some(role) = query.role {
            qb.push(" AND role = ");
            qb.push_bind(role);
        }
        qb.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        qb.push_bind(query.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(query.page.offset());

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(tx.as_mut())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn update_user(&self, tx: &mut PgTx, user: &UserRecord) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users \
             SET first_name = $2, last_name = $3, email = $4, phone_number = $5, \
                 password_hash = $6, role = $7, updated_at = clock_timestamp() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.phone_number.as_deref())
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_optional(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_user(&self, tx: &mut PgTx, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
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
