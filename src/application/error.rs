use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dollar_coffee_api_types::MessageResponse;
use thiserror::Error;

use crate::{
    application::{
        accounts::AccountError, admin::AdminError, orders::OrderError, pagination::PaginationError,
        repos::RepoError,
    },
    domain::error::DomainError,
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("{0}")]
    NotFound(String),
    #[error("missing or malformed caller identity")]
    MissingIdentity,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<PaginationError> for AppError {
    fn from(err: PaginationError) -> Self {
        Self::Validation(err.to_string())
    }
}

fn repo_status(err: &RepoError) -> StatusCode {
    match err {
        RepoError::ConstraintViolation { .. } => StatusCode::CONFLICT,
        RepoError::NotFound => StatusCode::NOT_FOUND,
        RepoError::InvalidRequest { .. } | RepoError::Pagination(_) => StatusCode::BAD_REQUEST,
        RepoError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        RepoError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Domain(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingIdentity => StatusCode::FORBIDDEN,
            AppError::Infra(InfraError::Database { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Repo(err) => repo_status(err),
            AppError::Order(err) => match err {
                OrderError::InvalidRequest(_) | OrderError::InvalidCoffee { .. } => {
                    StatusCode::BAD_REQUEST
                }
                OrderError::Forbidden => StatusCode::FORBIDDEN,
                OrderError::Repo(err) => repo_status(err),
            },
            AppError::Admin(err) => match err {
                AdminError::Forbidden => StatusCode::FORBIDDEN,
                AdminError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                AdminError::NotFound { .. } => StatusCode::NOT_FOUND,
                AdminError::Repo(err) => repo_status(err),
            },
            AppError::Account(err) => match err {
                AccountError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                AccountError::EmailTaken => StatusCode::CONFLICT,
                AccountError::UnknownAccount => StatusCode::NOT_FOUND,
                AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AccountError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AccountError::Repo(err) => repo_status(err),
            },
        }
    }

    /// Message sent to the client. Server-side failures never leak details.
    fn presentation_message(&self, status: StatusCode) -> String {
        match status {
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            status if status.is_server_error() => "Unexpected error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message(status);
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, Json(MessageResponse::new(message))).into_response();
        report.attach(&mut response);
        response
    }
}
