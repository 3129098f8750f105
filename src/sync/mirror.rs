//! Local Roster Mirror
//!
//! In-memory cache of the authoritative roster for one viewer. Snapshots
//! are replaced wholesale under a single write-lock assignment, so readers
//! observe either the previous full snapshot or the next one, never an
//! interleaving. A failed refresh leaves the last known-good snapshot in
//! place.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::store::{PlayerRecord, RecordId, RosterStore, StoreError};

/// Hash of a mirror snapshot, for convergence checks (256 bits).
pub type SnapshotHash = [u8; 32];

/// Cheap-clone handle to one viewer's roster snapshot.
#[derive(Clone, Default)]
pub struct RosterMirror {
    snapshot: Arc<RwLock<Vec<PlayerRecord>>>,
}

impl RosterMirror {
    /// Create an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full roster from the store and swap it in atomically.
    ///
    /// Returns the record count on success. On error the previous snapshot
    /// is untouched and the error comes back as a value.
    pub async fn load(&self, store: &dyn RosterStore) -> Result<usize, StoreError> {
        // Suspend on the fetch before touching the lock; the old snapshot
        // stays readable for the whole round trip.
        let records = store.select_all().await?;
        Ok(self.replace(records).await)
    }

    /// Swap in an already-fetched snapshot. Returns the record count.
    pub async fn replace(&self, records: Vec<PlayerRecord>) -> usize {
        let count = records.len();
        *self.snapshot.write().await = records;
        count
    }

    /// Clone of the current snapshot, in stable id order.
    pub async fn snapshot(&self) -> Vec<PlayerRecord> {
        self.snapshot.read().await.clone()
    }

    /// Look up one record by id.
    pub async fn get(&self, id: &RecordId) -> Option<PlayerRecord> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|record| record.id == *id)
            .cloned()
    }

    /// Number of mirrored records.
    pub async fn len(&self) -> usize {
        self.snapshot.read().await.len()
    }

    /// True when nothing is mirrored yet.
    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.is_empty()
    }

    /// Hash of the current snapshot's canonical JSON.
    ///
    /// Two mirrors of the same store converge to the same hash once the
    /// last write's notification has been processed by both.
    pub async fn snapshot_hash(&self) -> SnapshotHash {
        let guard = self.snapshot.read().await;
        let bytes = serde_json::to_vec(&*guard).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(b"ROSTER_SNAPSHOT_V1");
        hasher.update(&bytes);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rank::Rank;
    use crate::store::memory::MemoryStore;
    use crate::store::RosterUpdate;

    fn record(id: &str, name: &str) -> PlayerRecord {
        let mut record = PlayerRecord::new(RecordId::new(id));
        record.name = Some(name.into());
        record
    }

    #[tokio::test]
    async fn test_load_replaces_snapshot() {
        let store = MemoryStore::new();
        store.insert(record("a", "Ada")).await;
        store.insert(record("b", "Bo")).await;

        let mirror = RosterMirror::new();
        assert_eq!(mirror.load(&store).await.unwrap(), 2);
        assert_eq!(mirror.len().await, 2);
        assert_eq!(
            mirror.get(&RecordId::new("a")).await.unwrap().name.as_deref(),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn test_reload_idempotence() {
        let store = MemoryStore::new();
        store.insert(record("a", "Ada")).await;

        let mirror = RosterMirror::new();
        mirror.load(&store).await.unwrap();
        let first = mirror.snapshot_hash().await;

        mirror.load(&store).await.unwrap();
        let second = mirror.snapshot_hash().await;

        assert_eq!(first, second);
        assert_eq!(mirror.snapshot().await, store.select_all().await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_last_snapshot() {
        let store = MemoryStore::new();
        let id = store.insert(record("a", "Ada")).await;

        let mirror = RosterMirror::new();
        mirror.load(&store).await.unwrap();

        store.set_read_failures(true);
        store
            .update_fields(&id, RosterUpdate::rank(Rank::Gold))
            .await
            .unwrap();
        assert!(mirror.load(&store).await.is_err());

        // Stale but intact, not cleared
        let snapshot = mirror.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].rank, Rank::Unranked);
    }

    #[tokio::test]
    async fn test_hash_tracks_content() {
        let store = MemoryStore::new();
        let id = store.insert(record("a", "Ada")).await;

        let mirror = RosterMirror::new();
        mirror.load(&store).await.unwrap();
        let before = mirror.snapshot_hash().await;

        store
            .update_fields(&id, RosterUpdate::rank(Rank::Gold))
            .await
            .unwrap();
        mirror.load(&store).await.unwrap();

        assert_ne!(before, mirror.snapshot_hash().await);
    }
}
