use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::application::error::ErrorReport;
use crate::application::uow::UnitOfWork;
use crate::infra::http::HttpState;

const SOURCE: &str = "infra::http::health";

/// 204 when a storage transaction can be opened, 503 otherwise.
pub async fn health<U>(State(state): State<HttpState<U>>) -> Response
where
    U: UnitOfWork + 'static,
{
    match state.uow.begin().await {
        Ok(tx) => {
            if let Err(err) = state.uow.rollback(tx).await {
                warn!(target = SOURCE, error = %err, "health check rollback failed");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(SOURCE, StatusCode::SERVICE_UNAVAILABLE, &err)
                .attach(&mut response);
            response
        }
    }
}
