//! HTTP surface: router assembly, shared state, and the mapping from the
//! domain error taxonomy to status codes.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use keeper_core::Error;
use sqlx::PgPool;
use tracing::{debug, error};

pub mod auth;
pub mod binaries;
pub mod cards;
pub mod clients;
pub mod credentials;
pub mod texts;
pub mod users;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub token_secret: Arc<String>,
}

impl AppState {
    pub fn new(db: PgPool, token_secret: String) -> Self {
        AppState {
            db,
            token_secret: Arc::new(token_secret),
        }
    }
}

/// Domain error carried out of a handler. The conversion to a response
/// is the single place status codes are decided.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::AlreadyExists => StatusCode::CONFLICT,
            Error::Unauthenticated | Error::PasswordMismatch => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            debug!(error = %self.0, %status, "request rejected");
        }
        status.into_response()
    }
}

/// Assemble the full route table. Register and login are the only
/// unauthenticated paths; everything else sits behind the token
/// middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/user/register", post(users::register))
        .route("/api/user/login", post(users::login));

    let protected = Router::new()
        .route(
            "/api/user/client",
            post(clients::register).put(clients::update),
        )
        .route("/api/user/texts", get(texts::list).post(texts::save))
        .route(
            "/api/user/texts/{id}",
            get(texts::get_by_id).delete(texts::delete),
        )
        .route("/api/user/texts/sync", post(texts::sync))
        .route(
            "/api/user/credentials",
            get(credentials::list).post(credentials::save),
        )
        .route(
            "/api/user/credentials/{id}",
            get(credentials::get_by_id).delete(credentials::delete),
        )
        .route("/api/user/credentials/sync", post(credentials::sync))
        .route("/api/user/cards", get(cards::list).post(cards::save))
        .route(
            "/api/user/cards/{id}",
            get(cards::get_by_id).delete(cards::delete),
        )
        .route("/api/user/cards/sync", post(cards::sync))
        .route(
            "/api/user/binaries",
            get(binaries::list).post(binaries::save),
        )
        .route(
            "/api/user/binaries/{id}",
            get(binaries::get_by_id).delete(binaries::delete),
        )
        .route("/api/user/binaries/sync", post(binaries::sync))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    public.merge(protected).with_state(state)
}
