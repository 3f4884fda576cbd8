use std::env;
use std::net::SocketAddr;
use std::path::Path;

use eyre::{eyre, Result, WrapErr};
use keeper_core::redact::Redacted;

const DEFAULT_RUN_ADDRESS: &str = "127.0.0.1:8081";

/// Server configuration, loaded from the environment. The database URI
/// (may contain credentials) and the token secret stay wrapped in
/// [`Redacted`], so the derived `Debug` is log-safe.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, `RUN_ADDRESS`.
    pub run_address: String,
    /// PostgreSQL connection string, `DATABASE_URI`.
    pub database_uri: Redacted<String>,
    /// HMAC key for bearer tokens, `TOKEN_SECRET`.
    pub token_secret: Redacted<String>,
}

impl Config {
    /// Load configuration: `.env` file if present, then the environment.
    pub fn load() -> Result<Self> {
        if Path::new(".env").exists() {
            dotenvy::from_filename(".env").wrap_err("Failed to load .env file")?;
        }
        Self::load_from_env()
    }

    fn load_from_env() -> Result<Self> {
        let config = Config {
            run_address: env::var("RUN_ADDRESS").unwrap_or_else(|_| DEFAULT_RUN_ADDRESS.into()),
            database_uri: Redacted(
                env::var("DATABASE_URI")
                    .map_err(|_| eyre!("DATABASE_URI environment variable is required"))?,
            ),
            token_secret: Redacted(
                env::var("TOKEN_SECRET").unwrap_or_else(|_| "KeeperSecretKey".into()),
            ),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.run_address
            .parse::<SocketAddr>()
            .map_err(|e| eyre!("RUN_ADDRESS {:?} is not a socket address: {e}", self.run_address))?;
        if self.database_uri.expose().is_empty() {
            return Err(eyre!("DATABASE_URI cannot be empty"));
        }
        if self.token_secret.expose().is_empty() {
            return Err(eyre!("TOKEN_SECRET cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            run_address: "127.0.0.1:8081".into(),
            database_uri: Redacted("postgres://localhost/keeper".into()),
            token_secret: Redacted("secret".into()),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn bad_address_is_rejected() {
        let mut config = valid();
        config.run_address = "not-an-address".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut config = valid();
        config.token_secret = Redacted(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = valid();
        config.database_uri = Redacted("postgres://user:hunter2@db/keeper".into());
        config.token_secret = Redacted("signing-key-value".into());
        let out = format!("{config:?}");
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("signing-key-value"));
        assert!(out.contains("<redacted>"));
        assert!(out.contains("127.0.0.1:8081"));
    }
}
