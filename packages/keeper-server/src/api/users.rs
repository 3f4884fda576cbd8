//! Registration and login: the two unauthenticated endpoints. Both
//! return the issued token in the `Authorization` response header and
//! blank the password hash before the user record leaves the server.

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use keeper_core::model::{AuthUser, User};
use keeper_core::{password, token, Error};
use serde::Serialize;
use tracing::debug;

use super::{ApiError, AppState};

#[derive(Serialize)]
struct FieldError {
    field: &'static str,
    errors: Vec<String>,
}

/// Non-blank login and password. Violations become a 400 with one entry
/// per offending field.
fn validate(auth_user: &AuthUser) -> Result<(), Vec<FieldError>> {
    let mut field_errors = Vec::new();
    if auth_user.login.trim().is_empty() {
        field_errors.push(FieldError {
            field: "login",
            errors: vec!["login is not valid".into()],
        });
    }
    if auth_user.password.trim().is_empty() {
        field_errors.push(FieldError {
            field: "password",
            errors: vec!["password is not valid".into()],
        });
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(field_errors)
    }
}

fn with_token(user: User, secret: &[u8]) -> Result<Response, ApiError> {
    let issued = token::issue(user.id, secret)?;
    let header_value = HeaderValue::from_str(&issued)
        .map_err(|_| Error::Storage("token is not a valid header value".into()))?;

    let mut response = (StatusCode::OK, Json(user)).into_response();
    response
        .headers_mut()
        .insert(header::AUTHORIZATION, header_value);
    Ok(response)
}

pub async fn register(
    State(state): State<AppState>,
    Json(auth_user): Json<AuthUser>,
) -> Result<Response, ApiError> {
    if let Err(field_errors) = validate(&auth_user) {
        debug!("registration payload is not valid");
        return Ok((StatusCode::BAD_REQUEST, Json(field_errors)).into_response());
    }

    let hash = password::hash(&auth_user.password)?;
    let mut user = crate::db::users::create(&state.db, &auth_user.login, &hash).await?;
    user.password_hash.clear();
    with_token(user, state.token_secret.as_bytes())
}

pub async fn login(
    State(state): State<AppState>,
    Json(auth_user): Json<AuthUser>,
) -> Result<Response, ApiError> {
    if let Err(field_errors) = validate(&auth_user) {
        debug!("login payload is not valid");
        return Ok((StatusCode::BAD_REQUEST, Json(field_errors)).into_response());
    }

    // An unknown login and a wrong password are indistinguishable to the
    // caller: both are 401.
    let mut user = match crate::db::users::find_by_login(&state.db, &auth_user.login).await {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::Unauthenticated.into()),
        Err(e) => return Err(e.into()),
    };
    password::verify(&auth_user.password, &user.password_hash)?;

    user.password_hash.clear();
    with_token(user, state.token_secret.as_bytes())
}
