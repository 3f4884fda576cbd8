//! Credential endpoints. Payloads arrive and leave as ciphertext.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keeper_core::model::Credentials;
use keeper_core::{Error, SyncBatch};
use uuid::Uuid;

use super::auth::AuthUserId;
use super::{ApiError, AppState};
use crate::{db, sync};

pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
) -> Result<Response, ApiError> {
    let creds = db::credentials::find_by_user(&state.db, user_id).await?;
    if creds.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok((StatusCode::OK, Json(creds)).into_response())
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let cred = db::credentials::find_by_id(&state.db, id).await?;
    if cred.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    Ok((StatusCode::OK, Json(cred)).into_response())
}

pub async fn save(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(mut cred): Json<Credentials>,
) -> Result<StatusCode, ApiError> {
    cred.user_id = user_id;
    db::credentials::save(&state.db, &cred).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let cred = db::credentials::find_by_id(&state.db, id).await?;
    if cred.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    db::credentials::soft_delete(&state.db, id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn sync(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(batch): Json<SyncBatch<Credentials>>,
) -> Result<Response, ApiError> {
    let delta = sync::sync_credentials(&state.db, user_id, batch).await?;
    Ok((StatusCode::ACCEPTED, Json(delta)).into_response())
}
