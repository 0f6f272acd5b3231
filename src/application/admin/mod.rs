//! Application services for the administrative surface.

pub mod coffees;
pub mod purchases;
pub mod users;

pub use coffees::AdminCoffeeService;
pub use purchases::AdminPurchaseService;
pub use users::AdminUserService;

use thiserror::Error;

use crate::application::pagination::PaginationError;
use crate::application::repos::RepoError;
use crate::domain::users::Actor;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin role required")]
    Forbidden,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<PaginationError> for AdminError {
    fn from(err: PaginationError) -> Self {
        AdminError::InvalidRequest(err.to_string())
    }
}

impl AdminError {
    fn invalid(message: impl Into<String>) -> Self {
        AdminError::InvalidRequest(message.into())
    }

    /// Map a storage `NotFound` onto the named entity.
    fn missing(entity: &'static str) -> impl Fn(RepoError) -> AdminError {
        move |err| match err {
            RepoError::NotFound => AdminError::NotFound { entity },
            other => AdminError::Repo(other),
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), AdminError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AdminError::Forbidden)
    }
}
