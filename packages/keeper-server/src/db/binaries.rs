//! Queries for the `binaries` table. `data` holds the encrypted base64
//! payload.

use chrono::{DateTime, Utc};
use keeper_core::model::{Binary, Status};
use keeper_core::Error;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::rows::BinaryRow;
use super::map_sqlx;

const BINARY_SELECT: &str = "id, name, data, user_id, status, modified_tms";

pub async fn save<'e>(ex: impl PgExecutor<'e>, bin: &Binary) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO binaries (id, name, data, user_id, status, modified_tms)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            data = EXCLUDED.data,
            status = EXCLUDED.status,
            modified_tms = EXCLUDED.modified_tms
        "#,
    )
    .bind(bin.id)
    .bind(&bin.name)
    .bind(&bin.data)
    .bind(bin.user_id)
    .bind(bin.status.as_str())
    .bind(bin.modified_tms)
    .execute(ex)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<Binary, Error> {
    let query = format!("SELECT {BINARY_SELECT} FROM binaries WHERE id = $1");
    let row = sqlx::query_as::<_, BinaryRow>(&query)
        .bind(id)
        .fetch_optional(ex)
        .await
        .map_err(map_sqlx)?
        .ok_or(Error::NotFound)?;
    row.try_into()
}

pub async fn find_by_user(ex: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<Binary>, Error> {
    let query = format!("SELECT {BINARY_SELECT} FROM binaries WHERE user_id = $1");
    let rows = sqlx::query_as::<_, BinaryRow>(&query)
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
) -> Result<Vec<Binary>, Error> {
    find_with_status(ex, user_id, tms, Status::Active).await
}

pub async fn find_deleted_modified_after(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
) -> Result<Vec<Binary>, Error> {
    find_with_status(ex, user_id, tms, Status::Deleted).await
}

async fn find_with_status(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
    status: Status,
) -> Result<Vec<Binary>, Error> {
    let query = format!(
        "SELECT {BINARY_SELECT} FROM binaries
         WHERE user_id = $1 AND modified_tms > $2 AND status = $3"
    );
    let rows = sqlx::query_as::<_, BinaryRow>(&query)
        .bind(user_id)
        .bind(tms)
        .bind(status.as_str())
        .fetch_all(ex)
        .await
        .map_err(map_sqlx)?;
    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn soft_delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<(), Error> {
    sqlx::query("UPDATE binaries SET status = $1, modified_tms = NOW() WHERE id = $2")
        .bind(Status::Deleted.as_str())
        .bind(id)
        .execute(ex)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}
