use axum::Json;
use axum::extract::{Query, State};
use dollar_coffee_api_types::MenuResponse;
use serde::Deserialize;

use crate::application::error::AppError;
use crate::application::uow::UnitOfWork;
use crate::infra::http::HttpState;

use super::{coffee_view, parse_page};

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub page: Option<String>,
    pub in_stock: Option<bool>,
}

pub async fn menu<U>(
    State(state): State<HttpState<U>>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<MenuResponse>, AppError>
where
    U: UnitOfWork + 'static,
{
    let coffees = state
        .menu
        .list(parse_page(query.page.as_deref()), query.in_stock)
        .await?;

    if coffees.is_empty() {
        return Err(AppError::not_found("Couldn't find coffees"));
    }

    Ok(Json(MenuResponse {
        coffees: coffees.into_iter().map(coffee_view).collect(),
    }))
}
