//! Text note endpoints: CRUD plus the per-kind sync exchange.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keeper_core::model::Text;
use keeper_core::{Error, SyncBatch};
use uuid::Uuid;

use super::auth::AuthUserId;
use super::{ApiError, AppState};
use crate::{db, sync};

pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
) -> Result<Response, ApiError> {
    let texts = db::texts::find_by_user(&state.db, user_id).await?;
    if texts.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok((StatusCode::OK, Json(texts)).into_response())
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let text = db::texts::find_by_id(&state.db, id).await?;
    if text.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    Ok((StatusCode::OK, Json(text)).into_response())
}

pub async fn save(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(mut text): Json<Text>,
) -> Result<StatusCode, ApiError> {
    text.user_id = user_id;
    db::texts::save(&state.db, &text).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let text = db::texts::find_by_id(&state.db, id).await?;
    if text.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    db::texts::soft_delete(&state.db, id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn sync(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(batch): Json<SyncBatch<Text>>,
) -> Result<Response, ApiError> {
    let delta = sync::sync_texts(&state.db, user_id, batch).await?;
    Ok((StatusCode::ACCEPTED, Json(delta)).into_response())
}
