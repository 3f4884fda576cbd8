//! Device registry file: the single record holding this device's id and
//! last successful sync watermark.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use keeper_core::model::Client;
use keeper_core::{Error, Result};
use uuid::Uuid;

pub struct ClientFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ClientFile {
    pub fn new(working_dir: &Path) -> Self {
        ClientFile {
            path: working_dir.join("client.json"),
            lock: Mutex::new(()),
        }
    }

    /// The device record, if this device has been registered.
    pub fn find(&self) -> Result<Client> {
        let _guard = self.lock.lock().expect("registry mutex poisoned");
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound)
            }
            Err(err) => return Err(err.into()),
        };
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                return Ok(serde_json::from_str(&line)?);
            }
        }
        Err(Error::NotFound)
    }

    pub fn create(&self, client: &Client) -> Result<()> {
        let _guard = self.lock.lock().expect("registry mutex poisoned");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(client)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Advance the watermark through a temp sibling and atomic rename.
    pub fn update_sync_tms(&self, id: Uuid, sync_tms: DateTime<Utc>) -> Result<()> {
        let _guard = self.lock.lock().expect("registry mutex poisoned");

        let file = File::open(&self.path)?;
        let mut records: Vec<Client> = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut client: Client = serde_json::from_str(&line)?;
            if client.id == id {
                client.sync_tms = sync_tms;
            }
            records.push(client);
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut out = File::create(&tmp)?;
            for client in &records {
                let line = serde_json::to_string(client)?;
                writeln!(out, "{line}")?;
            }
            out.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use keeper_core::model::sync_epoch;
    use tempfile::TempDir;

    #[test]
    fn missing_registry_is_not_found() {
        let dir = TempDir::new().unwrap();
        let registry = ClientFile::new(dir.path());
        assert!(matches!(registry.find(), Err(Error::NotFound)));
    }

    #[test]
    fn create_and_advance_watermark() {
        let dir = TempDir::new().unwrap();
        let registry = ClientFile::new(dir.path());

        let client = Client::register(Uuid::new_v4());
        registry.create(&client).unwrap();

        let found = registry.find().unwrap();
        assert_eq!(found.id, client.id);
        assert_eq!(found.sync_tms, sync_epoch());

        let advanced = sync_epoch() + Duration::days(46_000);
        registry.update_sync_tms(client.id, advanced).unwrap();
        assert_eq!(registry.find().unwrap().sync_tms, advanced);
    }
}
