//! Account registration and password login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use dollar_coffee_api_types::{AuthResponse, LoginRequest, RegisterRequest};

use crate::application::accounts::RegisterCommand;
use crate::application::error::AppError;
use crate::application::uow::UnitOfWork;
use crate::infra::http::HttpState;

pub async fn register<U>(
    State(state): State<HttpState<U>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError>
where
    U: UnitOfWork + 'static,
{
    let command = RegisterCommand {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone_number: request.phone_number,
        password: request.password,
    };
    let user = state.accounts.register(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Created User".to_string(),
            user_id: user.id,
            role: user.role.as_str().to_string(),
        }),
    ))
}

pub async fn login<U>(
    State(state): State<HttpState<U>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError>
where
    U: UnitOfWork + 'static,
{
    let user = state
        .accounts
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        message: format!("Logged In as {}", user.first_name),
        user_id: user.id,
        role: user.role.as_str().to_string(),
    }))
}
