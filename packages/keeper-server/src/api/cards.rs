//! Card endpoints. Payloads arrive and leave as ciphertext.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keeper_core::model::Card;
use keeper_core::{Error, SyncBatch};
use uuid::Uuid;

use super::auth::AuthUserId;
use super::{ApiError, AppState};
use crate::{db, sync};

pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
) -> Result<Response, ApiError> {
    let cards = db::cards::find_by_user(&state.db, user_id).await?;
    if cards.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok((StatusCode::OK, Json(cards)).into_response())
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let card = db::cards::find_by_id(&state.db, id).await?;
    if card.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    Ok((StatusCode::OK, Json(card)).into_response())
}

pub async fn save(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(mut card): Json<Card>,
) -> Result<StatusCode, ApiError> {
    card.user_id = user_id;
    db::cards::save(&state.db, &card).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let card = db::cards::find_by_id(&state.db, id).await?;
    if card.user_id != user_id {
        return Err(Error::NotFound.into());
    }
    db::cards::soft_delete(&state.db, id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn sync(
    State(state): State<AppState>,
    Extension(AuthUserId(user_id)): Extension<AuthUserId>,
    Json(batch): Json<SyncBatch<Card>>,
) -> Result<Response, ApiError> {
    let delta = sync::sync_cards(&state.db, user_id, batch).await?;
    Ok((StatusCode::ACCEPTED, Json(delta)).into_response())
}
