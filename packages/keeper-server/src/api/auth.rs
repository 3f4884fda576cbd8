//! Token middleware: binds the authenticated user id to the request.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use keeper_core::token;
use tracing::debug;
use uuid::Uuid;

use super::AppState;

/// The authenticated principal, materialized into request extensions by
/// [`require_auth`]. A handler behind the middleware that fails to find
/// it is a programmer error and surfaces as 500.
#[derive(Debug, Clone, Copy)]
pub struct AuthUserId(pub Uuid);

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(raw) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        debug!("Authorization header not found");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match token::verify(raw, state.token_secret.as_bytes()) {
        Ok(user_id) => {
            req.extensions_mut().insert(AuthUserId(user_id));
            next.run(req).await
        }
        Err(_) => {
            debug!("token is not valid");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}
