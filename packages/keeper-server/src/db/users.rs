//! Queries for the `users` table.

use keeper_core::model::User;
use keeper_core::Error;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::rows::UserRow;
use super::map_sqlx;

/// Insert a new user with a server-assigned id. A duplicate login
/// surfaces as [`Error::AlreadyExists`] via the unique constraint.
pub async fn create<'e>(
    ex: impl PgExecutor<'e>,
    login: &str,
    password_hash: &str,
) -> Result<User, Error> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, login, password_hash) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(login)
        .bind(password_hash)
        .execute(ex)
        .await
        .map_err(map_sqlx)?;
    Ok(User {
        id,
        login: login.to_owned(),
        password_hash: password_hash.to_owned(),
    })
}

pub async fn find_by_login<'e>(ex: impl PgExecutor<'e>, login: &str) -> Result<User, Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, login, password_hash FROM users WHERE login = $1",
    )
    .bind(login)
    .fetch_optional(ex)
    .await
    .map_err(map_sqlx)?
    .ok_or(Error::NotFound)?;
    Ok(row.into())
}
