use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::{AppError, ErrorReport};
use crate::domain::{types::UserRole, users::Actor};

const SOURCE: &str = "dollar_coffee::http::response";

/// Caller id set by the gateway after it has verified the bearer token.
pub const ACTOR_ID_HEADER: &str = "x-user-id";
/// Caller role set by the gateway; absent means `user`.
pub const ACTOR_ROLE_HEADER: &str = "x-user-role";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let user_id = headers
        .get(ACTOR_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<Uuid>()
        .ok()?;
    let role = match headers.get(ACTOR_ROLE_HEADER) {
        Some(value) => value.to_str().ok()?.parse::<UserRole>().ok()?,
        None => UserRole::User,
    };
    Some(Actor::new(user_id, role))
}

/// Reject requests without a well-formed caller identity.
pub async fn require_actor(mut request: Request<Body>, next: Next) -> Response {
    let Some(actor) = actor_from_headers(request.headers()) else {
        return AppError::MissingIdentity.into_response();
    };
    request.extensions_mut().insert(actor);
    next.run(request).await
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let actor = actor_from_headers(request.headers())
        .map(|actor| actor.user_id.to_string())
        .unwrap_or_default();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = SOURCE,
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                actor = actor,
                "request failed",
            );
        } else {
            warn!(
                target = SOURCE,
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                actor = actor,
                "client request error",
            );
        }
    }

    response
}
