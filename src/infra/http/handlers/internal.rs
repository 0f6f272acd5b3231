//! Admin-only catalog, purchase and user management.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use dollar_coffee_api_types::{
    CoffeeCreateRequest, CoffeeUpdateRequest, CoffeeView, MessageResponse,
    PurchaseHistoryEntry, PurchaseUpdateRequest, UsersResponse,
};
use serde::Deserialize;

use crate::application::admin::coffees::{CreateCoffeeCommand, UpdateCoffeeCommand};
use crate::application::error::AppError;
use crate::application::uow::UnitOfWork;
use crate::domain::types::UserRole;
use crate::domain::users::Actor;
use crate::infra::http::HttpState;

use super::{coffee_view, parse_page, purchase_entry, user_view};

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub role: Option<String>,
}

pub async fn create_coffee<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CoffeeCreateRequest>,
) -> Result<(StatusCode, Json<CoffeeView>), AppError>
where
    U: UnitOfWork + 'static,
{
    let command = CreateCoffeeCommand {
        name: request.name,
        price: request.price,
        description: request.description,
        in_stock: request.in_stock,
    };
    let coffee = state.admin_coffees.create(&actor, command).await?;
    Ok((StatusCode::CREATED, Json(coffee_view(coffee))))
}

pub async fn update_coffee<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<CoffeeUpdateRequest>,
) -> Result<Json<CoffeeView>, AppError>
where
    U: UnitOfWork + 'static,
{
    let command = UpdateCoffeeCommand {
        name: request.name,
        price: request.price,
        description: request.description,
        in_stock: request.in_stock,
    };
    let coffee = state.admin_coffees.update(&actor, id, command).await?;
    Ok(Json(coffee_view(coffee)))
}

pub async fn delete_coffee<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError>
where
    U: UnitOfWork + 'static,
{
    state.admin_coffees.delete(&actor, id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Coffee deleted")),
    ))
}

pub async fn update_purchase<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<PurchaseUpdateRequest>,
) -> Result<(StatusCode, Json<PurchaseHistoryEntry>), AppError>
where
    U: UnitOfWork + 'static,
{
    let transaction = state
        .admin_purchases
        .set_amount_paid(&actor, id, request.amount_paid)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(purchase_entry(transaction))))
}

pub async fn list_users<U>(
    State(state): State<HttpState<U>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UsersResponse>, AppError>
where
    U: UnitOfWork + 'static,
{
    let role = query
        .role
        .as_deref()
        .map(str::parse::<UserRole>)
        .transpose()?;

    let users = state
        .admin_users
        .list(&actor, parse_page(query.page.as_deref()), role)
        .await?;

    if users.is_empty() {
        return Err(AppError::not_found("Couldn't find any users"));
    }

    Ok(Json(UsersResponse {
        message: "Users found".to_string(),
        users: users.into_iter().map(user_view).collect(),
    }))
}
