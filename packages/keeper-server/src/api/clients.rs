//! Device registry endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use keeper_core::model::Client;
use keeper_core::Error;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUserId;
use super::{ApiError, AppState};
use crate::db;

/// `POST /api/user/client` — register this device. Idempotent by client
/// id; the owner is always the authenticated principal.
pub async fn register(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(mut client): Json<Client>,
) -> Result<Response, ApiError> {
    client.user_id = user_id;
    db::clients::register(&state.db, &client).await?;
    Ok((StatusCode::CREATED, Json(client)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ClientUpdate {
    pub id: Uuid,
    pub sync_tms: DateTime<Utc>,
}

/// `PUT /api/user/client` — advance the device watermark after a
/// successful sync.
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(update): Json<ClientUpdate>,
) -> Result<StatusCode, ApiError> {
    let client = db::clients::find_by_id(&state.db, update.id).await?;
    if client.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    db::clients::update_sync_tms(&state.db, update.id, update.sync_tms).await?;
    Ok(StatusCode::OK)
}
