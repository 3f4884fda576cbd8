//! Queries for the `texts` table.

use chrono::{DateTime, Utc};
use keeper_core::model::{Status, Text};
use keeper_core::Error;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::rows::TextRow;
use super::map_sqlx;

/// Shared SELECT projection; active and tombstone queries fetch the same
/// columns, status alone distinguishes them.
const TEXT_SELECT: &str = "id, val, user_id, status, modified_tms";

pub async fn save<'e>(ex: impl PgExecutor<'e>, text: &Text) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO texts (id, val, user_id, status, modified_tms)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            val = EXCLUDED.val,
            status = EXCLUDED.status,
            modified_tms = EXCLUDED.modified_tms
        "#,
    )
    .bind(text.id)
    .bind(&text.text)
    .bind(text.user_id)
    .bind(text.status.as_str())
    .bind(text.modified_tms)
    .execute(ex)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<Text, Error> {
    let query = format!("SELECT {TEXT_SELECT} FROM texts WHERE id = $1");
    let row = sqlx::query_as::<_, TextRow>(&query)
        .bind(id)
        .fetch_optional(ex)
        .await
        .map_err(map_sqlx)?
        .ok_or(Error::NotFound)?;
    row.try_into()
}

pub async fn find_by_user(ex: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<Text>, Error> {
    let query = format!("SELECT {TEXT_SELECT} FROM texts WHERE user_id = $1");
    let rows = sqlx::query_as::<_, TextRow>(&query)
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
) -> Result<Vec<Text>, Error> {
    find_with_status(ex, user_id, tms, Status::Active).await
}

pub async fn find_deleted_modified_after(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
) -> Result<Vec<Text>, Error> {
    find_with_status(ex, user_id, tms, Status::Deleted).await
}

async fn find_with_status(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
    status: Status,
) -> Result<Vec<Text>, Error> {
    let query = format!(
        "SELECT {TEXT_SELECT} FROM texts
         WHERE user_id = $1 AND modified_tms > $2 AND status = $3"
    );
    let rows = sqlx::query_as::<_, TextRow>(&query)
        .bind(user_id)
        .bind(tms)
        .bind(status.as_str())
        .fetch_all(ex)
        .await
        .map_err(map_sqlx)?;
    rows.into_iter().map(TryInto::try_into).collect()
}

/// Tombstone the record in place and refresh its modification time so
/// the deletion propagates through watermark queries.
pub async fn soft_delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<(), Error> {
    sqlx::query("UPDATE texts SET status = $1, modified_tms = NOW() WHERE id = $2")
        .bind(Status::Deleted.as_str())
        .bind(id)
        .execute(ex)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}
