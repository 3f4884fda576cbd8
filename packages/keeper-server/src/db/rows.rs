//! Row structs bridging the SQL projections and the wire models.
//!
//! Records read from the store are by definition not new on the reading
//! device, so every conversion clears the transient flag.

use chrono::{DateTime, Utc};
use keeper_core::model::{Binary, Card, Client, Credentials, Status, Text, User};
use keeper_core::Error;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct TextRow {
    pub id: Uuid,
    pub val: String,
    pub user_id: Uuid,
    pub status: String,
    pub modified_tms: DateTime<Utc>,
}

impl TryFrom<TextRow> for Text {
    type Error = Error;

    fn try_from(row: TextRow) -> Result<Self, Error> {
        Ok(Text {
            id: row.id,
            text: row.val,
            new_on_device: false,
            user_id: row.user_id,
            status: row.status.parse::<Status>()?,
            modified_tms: row.modified_tms,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct CredentialsRow {
    pub id: Uuid,
    pub login: String,
    pub password: String,
    pub user_id: Uuid,
    pub status: String,
    pub modified_tms: DateTime<Utc>,
}

impl TryFrom<CredentialsRow> for Credentials {
    type Error = Error;

    fn try_from(row: CredentialsRow) -> Result<Self, Error> {
        Ok(Credentials {
            id: row.id,
            login: row.login,
            password: row.password,
            new_on_device: false,
            user_id: row.user_id,
            status: row.status.parse::<Status>()?,
            modified_tms: row.modified_tms,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct CardRow {
    pub id: Uuid,
    pub number: String,
    pub cvc: String,
    pub holder: String,
    pub user_id: Uuid,
    pub status: String,
    pub modified_tms: DateTime<Utc>,
}

impl TryFrom<CardRow> for Card {
    type Error = Error;

    fn try_from(row: CardRow) -> Result<Self, Error> {
        Ok(Card {
            id: row.id,
            number: row.number,
            cvc: row.cvc,
            holder: row.holder,
            new_on_device: false,
            user_id: row.user_id,
            status: row.status.parse::<Status>()?,
            modified_tms: row.modified_tms,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct BinaryRow {
    pub id: Uuid,
    pub name: String,
    pub data: String,
    pub user_id: Uuid,
    pub status: String,
    pub modified_tms: DateTime<Utc>,
}

impl TryFrom<BinaryRow> for Binary {
    type Error = Error;

    fn try_from(row: BinaryRow) -> Result<Self, Error> {
        Ok(Binary {
            id: row.id,
            name: row.name,
            data: row.data,
            new_on_device: false,
            user_id: row.user_id,
            status: row.status.parse::<Status>()?,
            modified_tms: row.modified_tms,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            login: row.login,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sync_tms: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            user_id: row.user_id,
            sync_tms: row.sync_tms,
        }
    }
}
