//! Queries for the `cards` table. Payload columns hold ciphertext.

use chrono::{DateTime, Utc};
use keeper_core::model::{Card, Status};
use keeper_core::Error;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::rows::CardRow;
use super::map_sqlx;

const CARD_SELECT: &str = "id, number, cvc, holder, user_id, status, modified_tms";

pub async fn save<'e>(ex: impl PgExecutor<'e>, card: &Card) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO cards (id, number, cvc, holder, user_id, status, modified_tms)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            number = EXCLUDED.number,
            cvc = EXCLUDED.cvc,
            holder = EXCLUDED.holder,
            status = EXCLUDED.status,
            modified_tms = EXCLUDED.modified_tms
        "#,
    )
    .bind(card.id)
    .bind(&card.number)
    .bind(&card.cvc)
    .bind(&card.holder)
    .bind(card.user_id)
    .bind(card.status.as_str())
    .bind(card.modified_tms)
    .execute(ex)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<Card, Error> {
    let query = format!("SELECT {CARD_SELECT} FROM cards WHERE id = $1");
    let row = sqlx::query_as::<_, CardRow>(&query)
        .bind(id)
        .fetch_optional(ex)
        .await
        .map_err(map_sqlx)?
        .ok_or(Error::NotFound)?;
    row.try_into()
}

pub async fn find_by_user(ex: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<Card>, Error> {
    let query = format!("SELECT {CARD_SELECT} FROM cards WHERE user_id = $1");
    let rows = sqlx::query_as::<_, CardRow>(&query)
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
) -> Result<Vec<Card>, Error> {
    find_with_status(ex, user_id, tms, Status::Active).await
}

pub async fn find_deleted_modified_after(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
) -> Result<Vec<Card>, Error> {
    find_with_status(ex, user_id, tms, Status::Deleted).await
}

async fn find_with_status(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    tms: DateTime<Utc>,
    status: Status,
) -> Result<Vec<Card>, Error> {
    let query = format!(
        "SELECT {CARD_SELECT} FROM cards
         WHERE user_id = $1 AND modified_tms > $2 AND status = $3"
    );
    let rows = sqlx::query_as::<_, CardRow>(&query)
        .bind(user_id)
        .bind(tms)
        .bind(status.as_str())
        .fetch_all(ex)
        .await
        .map_err(map_sqlx)?;
    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn soft_delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<(), Error> {
    sqlx::query("UPDATE cards SET status = $1, modified_tms = NOW() WHERE id = $2")
        .bind(Status::Deleted.as_str())
        .bind(id)
        .execute(ex)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}
