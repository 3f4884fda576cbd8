//! Queries for the `clients` table: one watermark record per device.

use chrono::{DateTime, Utc};
use keeper_core::model::Client;
use keeper_core::Error;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::rows::ClientRow;
use super::map_sqlx;

/// Idempotent by client id: re-registering the same device keeps its
/// existing watermark.
pub async fn register<'e>(ex: impl PgExecutor<'e>, client: &Client) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO clients (id, user_id, sync_tms)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(client.id)
    .bind(client.user_id)
    .bind(client.sync_tms)
    .execute(ex)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<Client, Error> {
    let row = sqlx::query_as::<_, ClientRow>(
        "SELECT id, user_id, sync_tms FROM clients WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(ex)
    .await
    .map_err(map_sqlx)?
    .ok_or(Error::NotFound)?;
    Ok(row.into())
}

pub async fn update_sync_tms<'e>(
    ex: impl PgExecutor<'e>,
    id: Uuid,
    sync_tms: DateTime<Utc>,
) -> Result<(), Error> {
    sqlx::query("UPDATE clients SET sync_tms = $1 WHERE id = $2")
        .bind(sync_tms)
        .bind(id)
        .execute(ex)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}
