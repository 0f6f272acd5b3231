//! Account registration and login.
//!
//! Password hashing sits behind [`CredentialHasher`]; token issuance lives
//! outside this crate.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::repos::{RepoError, UserRepository};
use crate::application::repositories::RepositorySet;
use crate::application::uow::{UnitOfWork, settle};
use crate::domain::entities::{NewUser, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::types::UserRole;
use crate::domain::users::{normalize_email, normalize_phone};

const SOURCE: &str = "dollar_coffee::application::accounts";
const MAX_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("no account matches this email")]
    UnknownAccount,
    #[error("could not verify user password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        let DomainError::Validation { message } = err;
        AccountError::InvalidRequest(message)
    }
}

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AccountError>;

    /// `Ok(false)` means the password does not match; errors are reserved for
    /// hashes that cannot be read.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AccountError>;
}

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password: String,
}

fn required_name(field: &str, value: &str) -> Result<String, AccountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccountError::InvalidRequest(format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AccountError::InvalidRequest(format!("{field} is too long")));
    }
    Ok(value.to_string())
}

pub struct AccountService<U: UnitOfWork> {
    uow: Arc<U>,
    users: Arc<dyn UserRepository<U::Tx>>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<U: UnitOfWork> AccountService<U> {
    pub fn new(
        uow: Arc<U>,
        repositories: &RepositorySet<U::Tx>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            uow,
            users: repositories.users.clone(),
            hasher,
        }
    }

    /// Create a customer account. New accounts always get the `user` role.
    pub async fn register(&self, command: RegisterCommand) -> Result<UserRecord, AccountError> {
        let first_name = required_name("first name", &command.first_name)?;
        let last_name = required_name("last name", &command.last_name)?;
        let email = normalize_email(&command.email)?;
        let phone_number = normalize_phone(command.phone_number.as_deref())?;
        if command.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::InvalidRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = NewUser {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            phone_number,
            password_hash: self.hasher.hash(&command.password)?,
            role: UserRole::User,
        };

        let mut tx = self.uow.begin().await?;
        let result = self.users.create(&mut tx, user).await.map_err(|err| match err {
            RepoError::ConstraintViolation { .. } => AccountError::EmailTaken,
            other => AccountError::Repo(other),
        });
        let created = settle(self.uow.as_ref(), tx, result).await?;
        info!(target = SOURCE, user_id = %created.id, "account registered");
        Ok(created)
    }

    /// Fetch the account for a login attempt. Always reads storage.
    pub async fn find_for_login(&self, email: &str) -> Result<UserRecord, AccountError> {
        let email = normalize_email(email)?;

        let mut tx = self.uow.begin().await?;
        let result = self
            .users
            .get_by_email(&mut tx, &email)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => AccountError::UnknownAccount,
                other => AccountError::Repo(other),
            });
        settle(self.uow.as_ref(), tx, result).await
    }

    /// Check credentials and return the matching account.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, AccountError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AccountError::InvalidRequest(
                "email and password are required".to_string(),
            ));
        }

        let user = self.find_for_login(email).await?;
        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(target = SOURCE, user_id = %user.id, "password mismatch");
            return Err(AccountError::InvalidCredentials);
        }
        Ok(user)
    }
}
