use std::env;
use std::path::PathBuf;

/// Suite configuration, loaded from the environment with local-dev
/// defaults. `DATABASE_URI` is optional; scenarios that need to inspect
/// server rows skip their database assertions without it.
#[derive(Debug, Clone)]
pub struct E2eConfig {
    /// Server address the clients talk to (`RUN_ADDRESS`).
    pub server_address: String,
    /// Path to the built keeper-client binary (`KEEPER_CLIENT_BIN`).
    pub client_bin: PathBuf,
    /// Optional direct database access (`DATABASE_URI`).
    pub database_uri: Option<String>,
}

impl E2eConfig {
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        E2eConfig {
            server_address: env::var("RUN_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8081".into()),
            client_bin: env::var("KEEPER_CLIENT_BIN")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("target/debug/keeper-client")),
            database_uri: env::var("DATABASE_URI").ok(),
        }
    }

    pub fn server_url(&self) -> String {
        if self.server_address.starts_with("http") {
            self.server_address.clone()
        } else {
            format!("http://{}", self.server_address)
        }
    }
}
