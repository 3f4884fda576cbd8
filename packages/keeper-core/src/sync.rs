//! Wire types for the sync protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The batch exchanged on `POST /api/user/{kind}/sync`: the caller's
/// watermark plus every record modified strictly after it. An empty
/// `items` list is a valid pull-only sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncBatch<T> {
    pub last_sync_tms: DateTime<Utc>,
    pub items: Vec<T>,
}

impl<T> SyncBatch<T> {
    pub fn new(last_sync_tms: DateTime<Utc>, items: Vec<T>) -> Self {
        SyncBatch {
            last_sync_tms,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{sync_epoch, Text};
    use uuid::Uuid;

    #[test]
    fn batch_round_trips_as_json() {
        let batch = SyncBatch::new(sync_epoch(), vec![Text::new("note".into(), Uuid::new_v4())]);
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains("last_sync_tms"));
        assert!(json.contains("items"));

        let back: SyncBatch<Text> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.last_sync_tms, batch.last_sync_tms);
        assert_eq!(back.items.len(), 1);
        assert_eq!(back.items[0].text, "note");
    }

    #[test]
    fn empty_batch_is_representable() {
        let batch: SyncBatch<Text> = SyncBatch::new(sync_epoch(), Vec::new());
        let json = serde_json::to_string(&batch).unwrap();
        let back: SyncBatch<Text> = serde_json::from_str(&json).unwrap();
        assert!(back.items.is_empty());
    }
}
