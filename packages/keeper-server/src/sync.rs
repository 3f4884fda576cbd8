//! Server-side sync engine: validates a batch, applies it under one
//! transaction with the last-writer-wins guard, and returns the delta
//! the caller is missing.
//!
//! The delta is computed BEFORE the batch is applied, so callers never
//! see echoes of their own submission. An empty batch is a valid
//! pull-only sync: the apply loop is a no-op and the delta is still
//! returned.

use chrono::{DateTime, Utc};
use keeper_core::model::{Binary, Card, Credentials, Text, VaultItem};
use keeper_core::{Error, SyncBatch};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::db;

/// The last-writer-wins guard: apply the incoming record unless the
/// stored one is strictly newer. Ties keep the existing record — first
/// to persist wins the tie.
fn should_apply(existing: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> bool {
    match existing {
        Some(stored) => incoming > stored,
        None => true,
    }
}

pub async fn sync_texts(
    db: &PgPool,
    user_id: Uuid,
    batch: SyncBatch<Text>,
) -> Result<Vec<Text>, Error> {
    debug!(%user_id, incoming = batch.items.len(), "text sync");

    let mut outgoing =
        db::texts::find_active_modified_after(db, user_id, batch.last_sync_tms).await?;
    outgoing
        .extend(db::texts::find_deleted_modified_after(db, user_id, batch.last_sync_tms).await?);

    let mut tx = db.begin().await.map_err(Error::storage)?;
    for mut item in batch.items {
        item.set_user_id(user_id);
        let stored = match db::texts::find_by_id(&mut *tx, item.id()).await {
            Ok(existing) => Some(existing.modified_tms()),
            Err(Error::NotFound) => None,
            Err(e) => return Err(e),
        };
        if !should_apply(stored, item.modified_tms()) {
            debug!(id = %item.id(), "skipped: newer version already stored");
            continue;
        }
        db::texts::save(&mut *tx, &item).await?;
    }
    tx.commit().await.map_err(Error::storage)?;

    Ok(outgoing)
}

pub async fn sync_credentials(
    db: &PgPool,
    user_id: Uuid,
    batch: SyncBatch<Credentials>,
) -> Result<Vec<Credentials>, Error> {
    debug!(%user_id, incoming = batch.items.len(), "credentials sync");

    let mut outgoing =
        db::credentials::find_active_modified_after(db, user_id, batch.last_sync_tms).await?;
    outgoing.extend(
        db::credentials::find_deleted_modified_after(db, user_id, batch.last_sync_tms).await?,
    );

    let mut tx = db.begin().await.map_err(Error::storage)?;
    for mut item in batch.items {
        item.set_user_id(user_id);
        let stored = match db::credentials::find_by_id(&mut *tx, item.id()).await {
            Ok(existing) => Some(existing.modified_tms()),
            Err(Error::NotFound) => None,
            Err(e) => return Err(e),
        };
        if !should_apply(stored, item.modified_tms()) {
            debug!(id = %item.id(), "skipped: newer version already stored");
            continue;
        }
        db::credentials::save(&mut *tx, &item).await?;
    }
    tx.commit().await.map_err(Error::storage)?;

    Ok(outgoing)
}

pub async fn sync_cards(
    db: &PgPool,
    user_id: Uuid,
    batch: SyncBatch<Card>,
) -> Result<Vec<Card>, Error> {
    debug!(%user_id, incoming = batch.items.len(), "card sync");

    let mut outgoing =
        db::cards::find_active_modified_after(db, user_id, batch.last_sync_tms).await?;
    outgoing
        .extend(db::cards::find_deleted_modified_after(db, user_id, batch.last_sync_tms).await?);

    let mut tx = db.begin().await.map_err(Error::storage)?;
    for mut item in batch.items {
        item.set_user_id(user_id);
        let stored = match db::cards::find_by_id(&mut *tx, item.id()).await {
            Ok(existing) => Some(existing.modified_tms()),
            Err(Error::NotFound) => None,
            Err(e) => return Err(e),
        };
        if !should_apply(stored, item.modified_tms()) {
            debug!(id = %item.id(), "skipped: newer version already stored");
            continue;
        }
        db::cards::save(&mut *tx, &item).await?;
    }
    tx.commit().await.map_err(Error::storage)?;

    Ok(outgoing)
}

pub async fn sync_binaries(
    db: &PgPool,
    user_id: Uuid,
    batch: SyncBatch<Binary>,
) -> Result<Vec<Binary>, Error> {
    debug!(%user_id, incoming = batch.items.len(), "binary sync");

    let mut outgoing =
        db::binaries::find_active_modified_after(db, user_id, batch.last_sync_tms).await?;
    outgoing
        .extend(db::binaries::find_deleted_modified_after(db, user_id, batch.last_sync_tms).await?);

    let mut tx = db.begin().await.map_err(Error::storage)?;
    for mut item in batch.items {
        item.set_user_id(user_id);
        let stored = match db::binaries::find_by_id(&mut *tx, item.id()).await {
            Ok(existing) => Some(existing.modified_tms()),
            Err(Error::NotFound) => None,
            Err(e) => return Err(e),
        };
        if !should_apply(stored, item.modified_tms()) {
            debug!(id = %item.id(), "skipped: newer version already stored");
            continue;
        }
        db::binaries::save(&mut *tx, &item).await?;
    }
    tx.commit().await.map_err(Error::storage)?;

    Ok(outgoing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn unknown_id_is_applied() {
        assert!(should_apply(None, Utc::now()));
    }

    #[test]
    fn newer_incoming_wins() {
        let stored = Utc::now();
        assert!(should_apply(Some(stored), stored + Duration::seconds(1)));
    }

    #[test]
    fn older_incoming_is_skipped() {
        let stored = Utc::now();
        assert!(!should_apply(Some(stored), stored - Duration::seconds(1)));
    }

    #[test]
    fn tie_keeps_the_existing_record() {
        let stored = Utc::now();
        assert!(!should_apply(Some(stored), stored));
    }
}
