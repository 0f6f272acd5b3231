//! HTTP surface: a thin axum wrapper over the application services.

pub mod handlers;
mod middleware;
mod state;


pub use middleware::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
pub use state::HttpState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};

use crate::application::uow::UnitOfWork;

use middleware::{log_responses, require_actor, set_request_context};

pub fn build_router<U>(state: HttpState<U>) -> Router
where
    U: UnitOfWork + 'static,
{
    let authenticated = Router::new()
        .route("/purchases/purchase", post(handlers::place_order::<U>))
        .route(
            "/purchases/user/{user_id}",
            get(handlers::purchase_history::<U>),
        )
        .route("/internal/coffee", post(handlers::create_coffee::<U>))
        .route(
            "/internal/coffee/{id}",
            patch(handlers::update_coffee::<U>).delete(handlers::delete_coffee::<U>),
        )
        .route(
            "/internal/purchase/{id}",
            patch(handlers::update_purchase::<U>),
        )
        .route("/internal/users", get(handlers::list_users::<U>))
        .route_layer(axum_middleware::from_fn(require_actor));

    Router::new()
        .route("/health", get(handlers::health::<U>))
        .route("/menu", get(handlers::menu::<U>))
        .route("/auth/register", post(handlers::register::<U>))
        .route("/auth/login", post(handlers::login::<U>))
        .merge(authenticated)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
