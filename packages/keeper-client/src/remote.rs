//! HTTP client for the keeper server: authentication, device registry,
//! and the per-kind sync exchange.

use std::time::Duration;

use chrono::{DateTime, Utc};
use keeper_core::model::{AuthUser, Client, Kind, User};
use keeper_core::{Error, Result, SyncBatch};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Per-request deadline; a hung sync must not wedge the CLI.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Remote {
    http: reqwest::Client,
    base_url: String,
}

impl Remote {
    /// `address` is either a bare `host:port` (plain HTTP) or a full
    /// URL; TLS termination is a deployment concern.
    pub fn new(address: &str) -> Result<Self> {
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_owned()
        } else {
            format!("http://{address}")
        };
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::transport)?;
        Ok(Remote { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register a new user. Returns the server-assigned record and the
    /// bearer token from the `Authorization` response header.
    pub async fn register(&self, auth: &AuthUser) -> Result<(User, String)> {
        let resp = self
            .http
            .post(self.url("/api/user/register"))
            .json(auth)
            .send()
            .await
            .map_err(transport_err)?;
        self.user_with_token(resp).await
    }

    pub async fn login(&self, auth: &AuthUser) -> Result<(User, String)> {
        let resp = self
            .http
            .post(self.url("/api/user/login"))
            .json(auth)
            .send()
            .await
            .map_err(transport_err)?;
        self.user_with_token(resp).await
    }

    async fn user_with_token(&self, resp: reqwest::Response) -> Result<(User, String)> {
        let resp = check_status(resp)?;
        let token = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthenticated)?
            .to_owned();
        let user: User = resp.json().await.map_err(Error::transport)?;
        debug!(user_id = %user.id, "authenticated against server");
        Ok((user, token))
    }

    pub async fn create_client(&self, token: &str, client: &Client) -> Result<Client> {
        let resp = self
            .http
            .post(self.url("/api/user/client"))
            .header(AUTHORIZATION, token)
            .json(client)
            .send()
            .await
            .map_err(transport_err)?;
        let resp = check_status(resp)?;
        resp.json().await.map_err(Error::transport)
    }

    pub async fn update_client_sync_tms(
        &self,
        token: &str,
        id: Uuid,
        sync_tms: DateTime<Utc>,
    ) -> Result<()> {
        let resp = self
            .http
            .put(self.url("/api/user/client"))
            .header(AUTHORIZATION, token)
            .json(&serde_json::json!({ "id": id, "sync_tms": sync_tms }))
            .send()
            .await
            .map_err(transport_err)?;
        check_status(resp)?;
        Ok(())
    }

    /// The per-kind sync exchange: push the outgoing batch, receive the
    /// authoritative delta.
    pub async fn sync<T>(&self, token: &str, kind: Kind, batch: &SyncBatch<T>) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.url(&format!("/api/user/{}/sync", kind.as_path_segment())))
            .header(AUTHORIZATION, token)
            .json(batch)
            .send()
            .await
            .map_err(transport_err)?;
        let resp = check_status(resp)?;
        resp.json().await.map_err(Error::transport)
    }
}

/// Timeouts surface as `Cancelled`; other request failures as
/// `Transport`.
fn transport_err(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Cancelled
    } else {
        Error::Transport(err.to_string())
    }
}

/// Map unsuccessful statuses into the domain taxonomy.
fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    match resp.status() {
        status if status.is_success() => Ok(resp),
        StatusCode::UNAUTHORIZED => Err(Error::Unauthenticated),
        StatusCode::NOT_FOUND => Err(Error::NotFound),
        StatusCode::CONFLICT => Err(Error::AlreadyExists),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(Error::Validation("server rejected the request".into()))
        }
        status => Err(Error::Transport(format!("server returned {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_gets_a_scheme() {
        let remote = Remote::new("127.0.0.1:8081").unwrap();
        assert_eq!(
            remote.url("/api/user/login"),
            "http://127.0.0.1:8081/api/user/login"
        );
    }

    #[test]
    fn explicit_scheme_is_preserved() {
        let remote = Remote::new("https://vault.example.com/").unwrap();
        assert_eq!(
            remote.url("/api/user/texts/sync"),
            "https://vault.example.com/api/user/texts/sync"
        );
    }
}
