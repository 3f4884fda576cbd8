//! Client service: the login chain, device registration, and the sync
//! engine that reconciles the local store with the server.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use keeper_core::model::{AuthUser, Binary, Card, Client, Credentials, Text, User, VaultItem};
use keeper_core::{password, Error, Result, SyncBatch};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::remote::Remote;
use crate::store::{ClientFile, FileStore, UserFile};

/// Outcome of the login chain: the resolved user plus a bearer token
/// when a remote round-trip already happened.
pub struct Session {
    pub user: User,
    token: Option<String>,
}

pub struct ClientService {
    pub texts: FileStore<Text>,
    pub credentials: FileStore<Credentials>,
    pub cards: FileStore<Card>,
    pub binaries: FileStore<Binary>,
    pub users: UserFile,
    pub registry: ClientFile,
    remote: Remote,
}

impl ClientService {
    pub fn open(working_dir: &Path, remote: Remote) -> Result<Self> {
        fs::create_dir_all(working_dir)?;
        Ok(ClientService {
            texts: FileStore::new(working_dir),
            credentials: FileStore::new(working_dir),
            cards: FileStore::new(working_dir),
            binaries: FileStore::new(working_dir),
            users: UserFile::new(working_dir),
            registry: ClientFile::new(working_dir),
            remote,
        })
    }

    /// The login chain: local user file first; otherwise remote login;
    /// otherwise remote registration. Whatever succeeds is persisted
    /// locally (with a fresh bcrypt hash) and the supplied password is
    /// verified against the local hash.
    pub async fn authenticate(&self, login: &str, supplied: &str) -> Result<Session> {
        if login.trim().is_empty() || supplied.trim().is_empty() {
            return Err(Error::Validation("login and password are required".into()));
        }

        match self.users.find() {
            Ok(user) => {
                password::verify(supplied, &user.password_hash)?;
                Ok(Session { user, token: None })
            }
            Err(Error::NotFound) => {
                let auth = AuthUser {
                    login: login.to_owned(),
                    password: supplied.to_owned(),
                };
                let (remote_user, token) = match self.remote.login(&auth).await {
                    Ok(outcome) => outcome,
                    Err(Error::Unauthenticated) | Err(Error::NotFound) => {
                        info!(login, "unknown to server, registering");
                        self.remote.register(&auth).await?
                    }
                    Err(e) => return Err(e),
                };

                let local = User {
                    id: remote_user.id,
                    login: remote_user.login,
                    password_hash: password::hash(supplied)?,
                };
                self.users.save(&local)?;
                Ok(Session {
                    user: local,
                    token: Some(token),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// A bearer token for remote calls, reusing the one from the login
    /// chain when a round-trip already happened.
    pub async fn ensure_token(&self, session: &Session, supplied: &str) -> Result<String> {
        if let Some(token) = &session.token {
            return Ok(token.clone());
        }
        let auth = AuthUser {
            login: session.user.login.clone(),
            password: supplied.to_owned(),
        };
        let (_, token) = self.remote.login(&auth).await?;
        Ok(token)
    }

    /// The device record, registering this device (epoch watermark) on
    /// first use.
    pub async fn ensure_client(&self, user_id: Uuid, token: &str) -> Result<Client> {
        match self.registry.find() {
            Ok(client) => Ok(client),
            Err(Error::NotFound) => {
                let client = Client::register(user_id);
                debug!(client_id = %client.id, "registering device");
                let client = self.remote.create_client(token, &client).await?;
                self.registry.create(&client)?;
                Ok(client)
            }
            Err(e) => Err(e),
        }
    }

    /// One full sync: all four kinds against the shared cursor, then the
    /// watermark advance — server first, then local. Any failure leaves
    /// the watermark unchanged; the next sync re-sends the same outgoing
    /// set and the server's id-keyed upserts absorb the repeat.
    pub async fn sync(&self, user: &User, token: &str) -> Result<()> {
        let now = Utc::now();
        let client = self.ensure_client(user.id, token).await?;
        let cursor = client.sync_tms;
        info!(client_id = %client.id, %cursor, "sync started");

        self.sync_kind(&self.binaries, user.id, cursor, token).await?;
        self.sync_kind(&self.cards, user.id, cursor, token).await?;
        self.sync_kind(&self.credentials, user.id, cursor, token)
            .await?;
        self.sync_kind(&self.texts, user.id, cursor, token).await?;

        self.remote
            .update_client_sync_tms(token, client.id, now)
            .await?;
        self.registry.update_sync_tms(client.id, now)?;
        info!(watermark = %now, "sync finished");
        Ok(())
    }

    /// The per-kind exchange; kinds differ only in element type.
    async fn sync_kind<T>(
        &self,
        store: &FileStore<T>,
        user_id: Uuid,
        cursor: DateTime<Utc>,
        token: &str,
    ) -> Result<()>
    where
        T: VaultItem + Serialize + DeserializeOwned,
    {
        let mut outgoing = store.find_active_modified_after(user_id, cursor)?;
        outgoing.extend(store.find_deleted_modified_after(user_id, cursor)?);
        debug!(kind = ?T::KIND, outgoing = outgoing.len(), "pushing changes");

        let incoming = self
            .remote
            .sync(token, T::KIND, &SyncBatch::new(cursor, outgoing))
            .await?;
        debug!(kind = ?T::KIND, incoming = incoming.len(), "ingesting delta");

        for mut item in incoming {
            // Append-if-absent, replace-if-present; the store's own
            // guards keep newer local copies and tombstones.
            item.set_new_on_device(false);
            store.save(&item)?;
        }
        Ok(())
    }
}
