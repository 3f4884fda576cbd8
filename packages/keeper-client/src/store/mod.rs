//! Append-only local store: one newline-delimited JSON file per item
//! kind inside the working directory, compacted through a temp sibling
//! and an atomic rename on update and delete.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use keeper_core::model::{Status, VaultItem};
use keeper_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub mod registry;
pub mod user;

pub use registry::ClientFile;
pub use user::UserFile;

/// Per-kind persistent set. A `new_on_device` record is appended; any
/// other save locates the existing line by id and rewrites the file.
/// Single-writer discipline per kind via the embedded mutex.
pub struct FileStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _kind: PhantomData<T>,
}

impl<T> FileStore<T>
where
    T: VaultItem + Serialize + DeserializeOwned,
{
    pub fn new(working_dir: &Path) -> Self {
        FileStore {
            path: working_dir.join(T::KIND.file_name()),
            lock: Mutex::new(()),
            _kind: PhantomData,
        }
    }

    /// Keep the stored record when it is strictly newer than the
    /// incoming one, and never let an active ingest overwrite a local
    /// tombstone: deletions do not resurrect through sync.
    fn keep_existing(existing: &T, incoming: &T) -> bool {
        if existing.modified_tms() > incoming.modified_tms() {
            return true;
        }
        existing.status() == Status::Deleted && incoming.status() == Status::Active
    }

    pub fn save(&self, item: &T) -> Result<()> {
        let _guard = self.lock.lock().expect("store mutex poisoned");

        if item.is_new_on_device() {
            return self.append(item);
        }

        let mut records = self.read_all()?;
        let mut replaced = false;
        records.retain(|existing| {
            if existing.id() != item.id() {
                return true;
            }
            if Self::keep_existing(existing, item) {
                // Stored copy wins; mark handled so nothing is appended.
                replaced = true;
                return true;
            }
            false
        });
        if !replaced {
            records.push(clone_via_json(item)?);
        }
        self.rewrite(&records)
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<T> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        self.read_all()?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or(Error::NotFound)
    }

    pub fn find_active_modified_after(
        &self,
        user_id: Uuid,
        tms: DateTime<Utc>,
    ) -> Result<Vec<T>> {
        self.find_with_status(user_id, tms, Status::Active)
    }

    pub fn find_deleted_modified_after(
        &self,
        user_id: Uuid,
        tms: DateTime<Utc>,
    ) -> Result<Vec<T>> {
        self.find_with_status(user_id, tms, Status::Deleted)
    }

    fn find_with_status(
        &self,
        user_id: Uuid,
        tms: DateTime<Utc>,
        status: Status,
    ) -> Result<Vec<T>> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|record| {
                record.user_id() == user_id
                    && record.modified_tms() > tms
                    && record.status() == status
            })
            .collect())
    }

    /// Flip the record to `DELETED` and refresh its modification time so
    /// the tombstone propagates on the next sync.
    pub fn soft_delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.lock.lock().expect("store mutex poisoned");

        let mut records = self.read_all()?;
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(Error::NotFound)?;
        record.set_status(Status::Deleted);
        record.set_modified_tms(Utc::now());
        self.rewrite(&records)
    }

    fn append(&self, item: &T) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(item)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<T>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Write the full record set to a temp sibling, then rename over the
    /// live file. A failure at any point leaves the previous state
    /// intact.
    fn rewrite(&self, records: &[T]) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            for record in records {
                let line = serde_json::to_string(record)?;
                writeln!(file, "{line}")?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Round-trip through serde to clone without a `Clone` bound. Drops the
/// transient new-flag the same way the wire does.
fn clone_via_json<T: Serialize + DeserializeOwned>(item: &T) -> Result<T> {
    Ok(serde_json::from_str(&serde_json::to_string(item)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use keeper_core::model::Text;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore<Text> {
        FileStore::new(dir.path())
    }

    fn stored_text(store: &FileStore<Text>, user_id: Uuid) -> Text {
        let text = Text::new("first".into(), user_id);
        store.save(&text).unwrap();
        text
    }

    #[test]
    fn save_new_appends_and_find_reads_back() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();

        let a = stored_text(&store, user_id);
        let b = stored_text(&store, user_id);

        assert_eq!(store.find_by_id(a.id).unwrap().text, "first");
        assert_eq!(store.find_by_id(b.id).unwrap().text, "first");
        assert!(matches!(
            store.find_by_id(Uuid::new_v4()),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn update_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();
        let original = stored_text(&store, user_id);

        let mut updated = original.clone();
        updated.new_on_device = false;
        updated.text = "second".into();
        updated.modified_tms = original.modified_tms + Duration::seconds(1);
        store.save(&updated).unwrap();

        let found = store.find_by_id(original.id).unwrap();
        assert_eq!(found.text, "second");

        // Exactly one line for the id remains.
        let all = store.find_active_modified_after(user_id, keeper_core::model::sync_epoch());
        assert_eq!(all.unwrap().len(), 1);
    }

    #[test]
    fn stale_ingest_keeps_the_newer_local_copy() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();
        let local = stored_text(&store, user_id);

        let mut stale = local.clone();
        stale.new_on_device = false;
        stale.text = "stale".into();
        stale.modified_tms = local.modified_tms - Duration::hours(1);
        store.save(&stale).unwrap();

        assert_eq!(store.find_by_id(local.id).unwrap().text, "first");
    }

    #[test]
    fn ingest_of_unknown_id_creates_the_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();

        let mut incoming = Text::new("from server".into(), user_id);
        incoming.new_on_device = false;
        store.save(&incoming).unwrap();

        assert_eq!(store.find_by_id(incoming.id).unwrap().text, "from server");
    }

    #[test]
    fn tombstone_is_not_resurrected_by_active_ingest() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();
        let text = stored_text(&store, user_id);

        store.soft_delete(text.id).unwrap();

        let mut revived = text.clone();
        revived.new_on_device = false;
        revived.status = Status::Active;
        revived.modified_tms = Utc::now() + Duration::hours(1);
        store.save(&revived).unwrap();

        assert_eq!(store.find_by_id(text.id).unwrap().status, Status::Deleted);
    }

    #[test]
    fn soft_delete_refreshes_the_watermark() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();
        let text = stored_text(&store, user_id);
        let before = Utc::now() - Duration::seconds(1);

        store.soft_delete(text.id).unwrap();

        let deleted = store.find_deleted_modified_after(user_id, before).unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, text.id);
        assert!(deleted[0].modified_tms > text.modified_tms);

        let active = store
            .find_active_modified_after(user_id, keeper_core::model::sync_epoch())
            .unwrap();
        assert!(active.is_empty());

        assert!(matches!(
            store.soft_delete(Uuid::new_v4()),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn watermark_query_is_strictly_greater() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let user_id = Uuid::new_v4();
        let text = stored_text(&store, user_id);

        let at = store
            .find_active_modified_after(user_id, text.modified_tms)
            .unwrap();
        assert!(at.is_empty(), "records at the watermark are excluded");

        let before = store
            .find_active_modified_after(user_id, text.modified_tms - Duration::seconds(1))
            .unwrap();
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn other_users_records_are_filtered() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mine = Uuid::new_v4();
        stored_text(&store, mine);
        stored_text(&store, Uuid::new_v4());

        let found = store
            .find_active_modified_after(mine, keeper_core::model::sync_epoch())
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
