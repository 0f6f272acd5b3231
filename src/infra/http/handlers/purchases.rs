use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use dollar_coffee_api_types::{PurchaseConfirmation, PurchaseHistoryResponse, PurchaseRequest};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::uow::UnitOfWork;
use crate::domain::orders::OrderLine;
use crate::domain::users::Actor;
use crate::infra::http::HttpState;

use super::{parse_page, purchase_entry};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
}

/// Place an order for the calling user. Prices always come from the catalog.
pub async fn place_order<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseConfirmation>, AppError>
where
    U: UnitOfWork + 'static,
{
    let lines = request
        .items
        .into_iter()
        .map(|item| OrderLine::new(item.coffee_id, item.options))
        .collect();

    let placed = state.orders.place_order(actor.user_id, lines).await?;

    Ok(Json(PurchaseConfirmation {
        message: "Purchase Confirmed".to_string(),
        transaction_id: placed.transaction_id,
        total: placed.total,
        item_count: placed.item_count,
    }))
}

pub async fn purchase_history<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<PurchaseHistoryResponse>, AppError>
where
    U: UnitOfWork + 'static,
{
    let purchases = state
        .orders
        .history(&actor, user_id, parse_page(query.page.as_deref()))
        .await?;

    if purchases.is_empty() {
        return Err(AppError::not_found("Couldn't find any purchases"));
    }

    Ok(Json(PurchaseHistoryResponse {
        message: "Purchases found".to_string(),
        purchases: purchases.into_iter().map(purchase_entry).collect(),
        page_size: state.page_size,
    }))
}
