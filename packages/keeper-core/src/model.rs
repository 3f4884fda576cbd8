//! The item model: four vault item kinds sharing a common envelope, plus
//! the user and per-device client records.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::redact::Redacted;

/// Lifecycle status of a vault item. Deletion is a status transition,
/// never a physical removal while sync windows are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "DELETED")]
    Deleted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Deleted => "DELETED",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Status::Active),
            "DELETED" => Ok(Status::Deleted),
            other => Err(crate::Error::Storage(format!("unknown status {other:?}"))),
        }
    }
}

/// The closed set of item kinds. Adding a kind means touching the server
/// schema and both sync engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Credentials,
    Cards,
    Texts,
    Binaries,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Credentials, Kind::Cards, Kind::Texts, Kind::Binaries];

    /// Path segment used on the wire: `/api/user/{kind}`.
    pub fn as_path_segment(self) -> &'static str {
        match self {
            Kind::Credentials => "credentials",
            Kind::Cards => "cards",
            Kind::Texts => "texts",
            Kind::Binaries => "binaries",
        }
    }

    /// File name of the kind's local store.
    pub fn file_name(self) -> &'static str {
        match self {
            Kind::Credentials => "credentials.json",
            Kind::Cards => "card.json",
            Kind::Texts => "text.json",
            Kind::Binaries => "binary.json",
        }
    }
}

/// The capability set shared by all four item kinds. Both sync engines
/// and the local store are written against this trait.
pub trait VaultItem {
    fn id(&self) -> Uuid;
    fn user_id(&self) -> Uuid;
    fn set_user_id(&mut self, user_id: Uuid);
    fn is_new_on_device(&self) -> bool;
    fn set_new_on_device(&mut self, new_on_device: bool);
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
    fn modified_tms(&self) -> DateTime<Utc>;
    fn set_modified_tms(&mut self, tms: DateTime<Utc>);

    const KIND: Kind;
}

macro_rules! impl_vault_item {
    ($ty:ty, $kind:expr) => {
        impl VaultItem for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn user_id(&self) -> Uuid {
                self.user_id
            }
            fn set_user_id(&mut self, user_id: Uuid) {
                self.user_id = user_id;
            }
            fn is_new_on_device(&self) -> bool {
                self.new_on_device
            }
            fn set_new_on_device(&mut self, new_on_device: bool) {
                self.new_on_device = new_on_device;
            }
            fn status(&self) -> Status {
                self.status
            }
            fn set_status(&mut self, status: Status) {
                self.status = status;
            }
            fn modified_tms(&self) -> DateTime<Utc> {
                self.modified_tms
            }
            fn set_modified_tms(&mut self, tms: DateTime<Utc>) {
                self.modified_tms = tms;
            }

            const KIND: Kind = $kind;
        }
    };
}

/// Plaintext note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub id: Uuid,
    pub text: String,
    /// Locally minted, not yet known to the server. Never transmitted.
    #[serde(skip)]
    pub new_on_device: bool,
    pub user_id: Uuid,
    pub status: Status,
    pub modified_tms: DateTime<Utc>,
}

impl Text {
    pub fn new(text: String, user_id: Uuid) -> Self {
        Text {
            id: Uuid::new_v4(),
            text,
            new_on_device: true,
            user_id,
            status: Status::Active,
            modified_tms: Utc::now(),
        }
    }
}

impl_vault_item!(Text, Kind::Texts);

/// Login/password pair. Both fields are hex-encoded AES-GCM ciphertext;
/// plaintext never leaves the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub id: Uuid,
    pub login: String,
    pub password: String,
    #[serde(skip)]
    pub new_on_device: bool,
    pub user_id: Uuid,
    pub status: Status,
    pub modified_tms: DateTime<Utc>,
}

impl Credentials {
    pub fn new(login: String, password: String, user_id: Uuid) -> Self {
        Credentials {
            id: Uuid::new_v4(),
            login,
            password,
            new_on_device: true,
            user_id,
            status: Status::Active,
            modified_tms: Utc::now(),
        }
    }
}

impl_vault_item!(Credentials, Kind::Credentials);

/// Payment card. All three payload fields are hex-encoded AES-GCM
/// ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub number: String,
    pub cvc: String,
    pub holder: String,
    #[serde(skip)]
    pub new_on_device: bool,
    pub user_id: Uuid,
    pub status: Status,
    pub modified_tms: DateTime<Utc>,
}

impl Card {
    pub fn new(number: String, cvc: String, holder: String, user_id: Uuid) -> Self {
        Card {
            id: Uuid::new_v4(),
            number,
            cvc,
            holder,
            new_on_device: true,
            user_id,
            status: Status::Active,
            modified_tms: Utc::now(),
        }
    }
}

impl_vault_item!(Card, Kind::Cards);

/// Opaque binary blob. `data` is the base64 of the raw bytes, encrypted
/// with the dealer and hex-encoded like the other sensitive payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binary {
    pub id: Uuid,
    pub name: String,
    pub data: String,
    #[serde(skip)]
    pub new_on_device: bool,
    pub user_id: Uuid,
    pub status: Status,
    pub modified_tms: DateTime<Utc>,
}

impl Binary {
    pub fn new(name: String, data: String, user_id: Uuid) -> Self {
        Binary {
            id: Uuid::new_v4(),
            name,
            data,
            new_on_device: true,
            user_id,
            status: Status::Active,
            modified_tms: Utc::now(),
        }
    }
}

impl_vault_item!(Binary, Kind::Binaries);

/// Per-device registry record. `sync_tms` is the watermark used as the
/// strict lower bound of the next sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sync_tms: DateTime<Utc>,
}

impl Client {
    /// A freshly registered device starts at the epoch watermark so the
    /// first sync pulls everything.
    pub fn register(user_id: Uuid) -> Self {
        Client {
            id: Uuid::new_v4(),
            user_id,
            sync_tms: sync_epoch(),
        }
    }
}

/// The watermark origin: 1900-01-01 UTC.
pub fn sync_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
        .single()
        .expect("constant epoch date is valid")
}

/// Server-side user record. The hash is blanked before the record leaves
/// the server and never reaches formatted output.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password_hash", &Redacted(&self.password_hash))
            .finish()
    }
}

/// Registration/login request body. Carries the plaintext password, so
/// `Debug` goes through [`Redacted`].
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("login", &self.login)
            .field("password", &Redacted(&self.password))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flag_is_not_serialized() {
        let text = Text::new("note".into(), Uuid::new_v4());
        let json = serde_json::to_string(&text).unwrap();
        assert!(!json.contains("new_on_device"));

        let back: Text = serde_json::from_str(&json).unwrap();
        assert!(!back.new_on_device);
        assert_eq!(back.id, text.id);
        assert_eq!(back.text, "note");
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("ACTIVE".parse::<Status>().unwrap(), Status::Active);
        assert_eq!("DELETED".parse::<Status>().unwrap(), Status::Deleted);
        assert!("GONE".parse::<Status>().is_err());
        assert_eq!(Status::Deleted.as_str(), "DELETED");
    }

    #[test]
    fn status_serializes_upper_case() {
        let card = Card::new("n".into(), "c".into(), "h".into(), Uuid::new_v4());
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains(r#""status":"ACTIVE""#));
    }

    #[test]
    fn registered_client_starts_at_epoch() {
        let client = Client::register(Uuid::new_v4());
        assert_eq!(client.sync_tms, sync_epoch());
        assert_eq!(sync_epoch().format("%Y-%m-%d").to_string(), "1900-01-01");
    }

    #[test]
    fn user_debug_redacts_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            login: "denis".into(),
            password_hash: "$2b$04$sensitive-hash".into(),
        };
        let out = format!("{user:?}");
        assert!(!out.contains("sensitive-hash"));
        assert!(out.contains("<redacted>"));
        assert!(out.contains("denis"));

        let auth = AuthUser {
            login: "denis".into(),
            password: "hunter2".into(),
        };
        let out = format!("{auth:?}");
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn kind_paths_are_stable() {
        assert_eq!(Kind::Texts.as_path_segment(), "texts");
        assert_eq!(Kind::Credentials.as_path_segment(), "credentials");
        assert_eq!(Kind::Cards.as_path_segment(), "cards");
        assert_eq!(Kind::Binaries.as_path_segment(), "binaries");
    }
}
