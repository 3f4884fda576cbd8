//! Local user file: one record with the server-assigned id and the
//! bcrypt hash used for offline password checks.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keeper_core::model::User;
use keeper_core::{Error, Result};

pub struct UserFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserFile {
    pub fn new(working_dir: &Path) -> Self {
        UserFile {
            path: working_dir.join("user.json"),
            lock: Mutex::new(()),
        }
    }

    pub fn find(&self) -> Result<User> {
        let _guard = self.lock.lock().expect("user file mutex poisoned");
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

    pub fn save(&self, user: &User) -> Result<()> {
        let _guard = self.lock.lock().expect("user file mutex poisoned");
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            let line = serde_json::to_string(user)?;
            writeln!(file, "{line}")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn save_then_find() {
        let dir = TempDir::new().unwrap();
        let users = UserFile::new(dir.path());
        assert!(matches!(users.find(), Err(Error::NotFound)));

        let user = User {
            id: Uuid::new_v4(),
            login: "denis".into(),
            password_hash: "$2b$04$hash".into(),
        };
        users.save(&user).unwrap();

        let found = users.find().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.login, "denis");
        assert_eq!(found.password_hash, "$2b$04$hash");
    }
}
