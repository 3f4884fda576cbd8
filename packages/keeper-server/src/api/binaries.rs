//! Binary blob endpoints. `data` arrives and leaves encrypted.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keeper_core::model::Binary;
use keeper_core::{Error, SyncBatch};
use uuid::Uuid;

use super::auth::AuthUserId;
use super::{ApiError, AppState};
use crate::{db, sync};

pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
) -> Result<Response, ApiError> {
    let binaries = db::binaries::find_by_user(&state.db, user_id).await?;
    if binaries.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok((StatusCode::OK, Json(binaries)).into_response())
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bin = db::binaries::find_by_id(&state.db, id).await?;
    if bin.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    Ok((StatusCode::OK, Json(bin)).into_response())
}

pub async fn save(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(mut bin): Json<Binary>,
) -> Result<StatusCode, ApiError> {
    bin.user_id = user_id;
    db::binaries::save(&state.db, &bin).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let bin = db::binaries::find_by_id(&state.db, id).await?;
    if bin.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    db::binaries::soft_delete(&state.db, id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn sync(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(batch): Json<SyncBatch<Binary>>,
) -> Result<Response, ApiError> {
    let delta = sync::sync_binaries(&state.db, user_id, batch).await?;
    Ok((StatusCode::ACCEPTED, Json(delta)).into_response())
}
