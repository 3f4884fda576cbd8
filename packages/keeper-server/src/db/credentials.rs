//! Queries for the `credentials` table. Payload columns hold ciphertext;
//! the server never sees the plaintext login or password.

use chrono::{DateTime, Utc};
use keeper_core::model::{Credentials, Status};
use keeper_core::Error;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::rows::CredentialsRow;
use super::map_sqlx;

const CREDENTIALS_SELECT: &str = "id, login, password, user_id, status, modified_tms";

pub async fn save<'e>(ex: impl PgExecutor<'e>, cred: &Credentials) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO credentials (id, login, password, user_id, status, modified_tms)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            login = EXCLUDED.login,
            password = EXCLUDED.password,
            status = EXCLUDED.status,
            modified_tms = EXCLUDED.modified_tms
        "#,
    )
    .bind(cred.id)
    .bind(&cred.login)
    .bind(&cred.password)
    .bind(cred.user_id)
    .bind(cred.status.as_str())
    .bind(cred.modified_tms)
    .execute(ex)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<Credentials, Error> {
    let query = format!("SELECT {CREDENTIALS_SELECT} FROM credentials WHERE id = $1");
    let row = sqlx::query_as::<_, CredentialsRow>(&query)
        .bind(id)
        .fetch_optional(ex)
        .await
        .map_err(map_sqlx)?
        .ok_or(Error::NotFound)?;
    row.try_into()
}

pub async fn find_by_user(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Credentials>, Error> {
    let query = format!("SELECT {CREDENTIALS_SELECT} FROM credentials WHERE user_id = $1");
    let rows = sqlx::query_as::<_, CredentialsRow>(&query)
        .bind(user_id)
        .fetch_all(ex)
        .await
        .map_err(map_sqlx)?;
    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn find_active_modified_after(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
) -> Result<Vec<Credentials>, Error> {
    find_with_status(ex, user_id, tms, Status::Active).await
}

pub async fn find_deleted_modified_after(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
) -> Result<Vec<Credentials>, Error> {
    find_with_status(ex, user_id, tms, Status::Deleted).await
}

async fn find_with_status(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
    status: Status,
) -> Result<Vec<Credentials>, Error> {
    let query = format!(
        "SELECT {CREDENTIALS_SELECT} FROM credentials
         WHERE user_id = $1 AND modified_tms > $2 AND status = $3"
    );
    let rows = sqlx::query_as::<_, CredentialsRow>(&query)
        .bind(user_id)
        .bind(tms)
        .bind(status.as_str())
        .fetch_all(ex)
        .await
        .map_err(map_sqlx)?;
    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn soft_delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<(), Error> {
    sqlx::query("UPDATE credentials SET status = $1, modified_tms = NOW() WHERE id = $2")
        .bind(Status::Deleted.as_str())
        .bind(id)
        .execute(ex)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}
