//! Transaction scope management for multi-repository operations.

use async_trait::async_trait;
use tracing::warn;

use crate::application::repos::RepoError;

/// Opens and settles the transaction handle threaded through repository calls.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Tx: Send + 'static;

    async fn begin(&self) -> Result<Self::Tx, RepoError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), RepoError>;

    async fn rollback(&self, tx: Self::Tx) -> Result<(), RepoError>;
}

/// Commit `tx` when `result` is `Ok`, otherwise roll it back.
///
/// A failed rollback is logged and the original error is returned.
pub async fn settle<U, T, E>(uow: &U, tx: U::Tx, result: Result<T, E>) -> Result<T, E>
where
    U: UnitOfWork + ?Sized,
    E: From<RepoError> + std::fmt::Display,
{
    match result {
        Ok(value) => {
            uow.commit(tx).await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback(tx).await {
                warn!(
                    error = %rollback_err,
                    cause = %err,
                    "transaction rollback failed"
                );
            }
            Err(err)
        }
    }
}
