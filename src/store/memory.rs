//! In-Memory Roster Store
//!
//! Process-local [`RosterStore`] implementation backing tests and the demo
//! binary. Records live in a `BTreeMap` keyed by id, so `select_all` comes
//! back in stable id order; every committed mutation publishes a
//! [`ChangeEvent`] on a broadcast feed after its lock is released.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::{ChangeEvent, ChangeKind, PlayerRecord, RecordId, RosterStore, RosterUpdate, StoreError};

/// Buffered notifications per subscriber before the feed lags.
const CHANGE_FEED_CAPACITY: usize = 256;

struct Inner {
    records: RwLock<BTreeMap<RecordId, PlayerRecord>>,
    changes: broadcast::Sender<ChangeEvent>,
    /// Fault injection: when set, reads fail with `Unavailable`.
    fail_reads: AtomicBool,
}

/// In-memory roster store with a broadcast change feed.
///
/// Clones share the same roster and feed, so one instance can back several
/// concurrent viewers.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(BTreeMap::new()),
                changes,
                fail_reads: AtomicBool::new(false),
            }),
        }
    }

    /// Insert a record, stamping `last_updated` if unset.
    ///
    /// Record creation is a store-side operation, which is why this lives
    /// on the concrete store and not on [`RosterStore`].
    pub async fn insert(&self, mut record: PlayerRecord) -> RecordId {
        if record.last_updated.is_none() {
            record.last_updated = Some(Utc::now());
        }
        let id = record.id.clone();
        {
            let mut records = self.inner.records.write().await;
            records.insert(id.clone(), record);
        }
        self.publish(ChangeKind::Insert, Some(id.clone()));
        id
    }

    /// Remove a record. Returns whether it existed.
    pub async fn remove(&self, id: &RecordId) -> bool {
        let removed = {
            let mut records = self.inner.records.write().await;
            records.remove(id).is_some()
        };
        if removed {
            self.publish(ChangeKind::Delete, Some(id.clone()));
        }
        removed
    }

    /// Toggle read failures for exercising transient-error handling.
    pub fn set_read_failures(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.inner.records.read().await.len()
    }

    /// True when no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.records.read().await.is_empty()
    }

    // Publish after the write lock is released, so subscribers reloading on
    // the notification always observe the committed state.
    fn publish(&self, kind: ChangeKind, id: Option<RecordId>) {
        let receivers = self.inner.changes.send(ChangeEvent { kind, id }).unwrap_or(0);
        debug!(?kind, receivers, "change published");
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn select_all(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        let records = self.inner.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn update_fields(
        &self,
        id: &RecordId,
        update: RosterUpdate,
    ) -> Result<PlayerRecord, StoreError> {
        if update.is_empty() {
            // Nothing to write; no stamp, no notification.
            let records = self.inner.records.read().await;
            return records
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.clone()));
        }

        let written = {
            let mut records = self.inner.records.write().await;
            let record = records
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            if let Some(name) = update.name {
                record.name = Some(name);
            }
            if let Some(riot_id) = update.riot_id {
                record.riot_id = Some(riot_id);
            }
            if let Some(rank) = update.rank {
                record.rank = rank;
            }
            if let Some(division) = update.division {
                record.division = Some(division);
            }

            // The stamp must be strictly greater than the previous one even
            // when two writes land within clock resolution.
            let now = Utc::now();
            record.last_updated = Some(match record.last_updated {
                Some(prev) if now <= prev => prev + Duration::milliseconds(1),
                _ => now,
            });

            record.clone()
        };

        self.publish(ChangeKind::Update, Some(id.clone()));
        Ok(written)
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<ChangeEvent>, StoreError> {
        Ok(self.inner.changes.subscribe())
    }
}
