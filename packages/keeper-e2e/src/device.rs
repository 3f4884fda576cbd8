//! A simulated device: one working directory driven through the real
//! client binary, scraping the stdout contract
//! (`saved <kind> id = <uuid>` and friends).

use std::path::PathBuf;
use std::process::Output;

use eyre::{eyre, Result, WrapErr};
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

use crate::E2eConfig;

pub struct Device {
    config: E2eConfig,
    login: String,
    password: String,
    working_dir: PathBuf,
}

impl Device {
    /// A fresh device for `login`, with its own working directory under
    /// the system temp dir.
    pub fn new(config: &E2eConfig, name: &str, login: &str, password: &str) -> Result<Self> {
        let working_dir =
            std::env::temp_dir().join(format!("keeper-e2e-{name}-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&working_dir)
            .wrap_err_with(|| format!("creating device dir {}", working_dir.display()))?;
        Ok(Device {
            config: config.clone(),
            login: login.into(),
            password: password.into(),
            working_dir,
        })
    }

    pub fn working_dir(&self) -> &PathBuf {
        &self.working_dir
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut command = Command::new(&self.config.client_bin);
        command
            .arg(args[0])
            .args(&args[1..])
            .args(["--ul", &self.login])
            .args(["--up", &self.password])
            .args(["--wd", &self.working_dir.to_string_lossy()])
            .args(["--addr", &self.config.server_address])
            // Scenario S4 writes retrieved files into the cwd.
            .current_dir(&self.working_dir);

        let Output {
            status,
            stdout,
            stderr,
        } = command.output().await.wrap_err("spawning client binary")?;
        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        debug!(?args, %status, "client invocation");
        if !status.success() {
            return Err(eyre!(
                "client {:?} exited with {}: {}",
                args,
                status,
                String::from_utf8_lossy(&stderr)
            ));
        }
        Ok(stdout)
    }

    /// Scrape `<marker><id>` from the client's stdout.
    fn scrape_id(output: &str, marker: &str) -> Result<Uuid> {
        output
            .lines()
            .find_map(|line| line.split_once(marker).map(|(_, id)| id.trim()))
            .ok_or_else(|| eyre!("marker {marker:?} not found in output: {output}"))?
            .parse()
            .wrap_err("scraped id is not a uuid")
    }

    pub async fn save_text(&self, text: &str) -> Result<Uuid> {
        let out = self.run(&["text", "--a", "save", "--t", text, "--in", "true"]).await?;
        Self::scrape_id(&out, "saved text id = ")
    }

    pub async fn update_text(&self, id: Uuid, text: &str) -> Result<()> {
        self.run(&[
            "text", "--a", "save", "--t", text, "--in", "false", "--id", &id.to_string(),
        ])
        .await?;
        Ok(())
    }

    pub async fn get_text(&self, id: Uuid) -> Result<String> {
        self.run(&["text", "--a", "get", "--id", &id.to_string()]).await
    }

    pub async fn delete_text(&self, id: Uuid) -> Result<()> {
        self.run(&["text", "--a", "delete", "--id", &id.to_string()]).await?;
        Ok(())
    }

    pub async fn save_card(&self, number: &str, cvc: &str, holder: &str) -> Result<Uuid> {
        let out = self
            .run(&[
                "card", "--a", "save", "--n", number, "--c", cvc, "--hn", holder, "--in", "true",
            ])
            .await?;
        Self::scrape_id(&out, "saved card id = ")
    }

    pub async fn get_card(&self, id: Uuid) -> Result<String> {
        self.run(&["card", "--a", "get", "--id", &id.to_string()]).await
    }

    pub async fn save_credentials(&self, login: &str, password: &str) -> Result<Uuid> {
        let out = self
            .run(&["cred", "--a", "save", "--l", login, "--p", password, "--in", "true"])
            .await?;
        Self::scrape_id(&out, "saved credentials id = ")
    }

    pub async fn get_credentials(&self, id: Uuid) -> Result<String> {
        self.run(&["cred", "--a", "get", "--id", &id.to_string()]).await
    }

    pub async fn save_file(&self, path: &str) -> Result<Uuid> {
        let out = self
            .run(&["file", "--a", "save", "--f", path, "--in", "true"])
            .await?;
        Self::scrape_id(&out, "saved file id = ")
    }

    pub async fn get_file(&self, id: Uuid) -> Result<String> {
        self.run(&["file", "--a", "get", "--id", &id.to_string()]).await
    }

    pub async fn sync(&self) -> Result<()> {
        self.run(&["sync"]).await?;
        Ok(())
    }
}
