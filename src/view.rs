//! One Viewer Session
//!
//! [`BoardView`] is what a single viewer holds: a validated configuration,
//! an injected store handle, the live mirror behind a [`SyncController`],
//! and one [`EditSession`]. Rank and division changes write straight
//! through to the store; profile edits go through the buffered session so
//! concurrent remote writes can't clobber typing in progress.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::{BoardConfig, ConfigError};
use crate::core::rank::Rank;
use crate::core::tier;
use crate::store::{PlayerRecord, RecordId, RosterStore, RosterUpdate, StoreError};
use crate::sync::edit::{EditSession, FieldBuffer};
use crate::sync::mirror::{RosterMirror, SnapshotHash};
use crate::sync::{SyncController, SyncError, SyncHealth};

/// View-level errors.
///
/// Only the configuration and subscription variants are fatal; store
/// variants are transient, leave the mirror's last snapshot intact, and
/// are safe to retry through normal interaction.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Required store connection values are missing. Blocks the view.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The change feed could not be established. Blocks the view.
    #[error("sync startup failed: {0}")]
    Sync(#[from] SyncError),

    /// A store operation failed; the roster keeps its last good state.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// The record is not in the mirror.
    #[error("no such record: {0}")]
    UnknownRecord(RecordId),
}

/// A single viewer's session over the shared roster.
pub struct BoardView {
    config: BoardConfig,
    store: Arc<dyn RosterStore>,
    sync: SyncController,
    edit: EditSession,
}

impl BoardView {
    /// Validate the configuration, subscribe, and perform the initial
    /// load.
    ///
    /// Configuration and subscription failures are fatal here; everything
    /// after open degrades gracefully instead.
    pub async fn open(config: BoardConfig, store: Arc<dyn RosterStore>) -> Result<Self, ViewError> {
        config.validate()?;

        let sync = SyncController::start(store.clone(), RosterMirror::new()).await?;
        info!(store_url = %config.store_url, "board view opened");

        Ok(Self {
            config,
            store,
            sync,
            edit: EditSession::new(),
        })
    }

    /// The view's configuration.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Current roster snapshot, in stable id order.
    pub async fn roster(&self) -> Vec<PlayerRecord> {
        self.sync.mirror().snapshot().await
    }

    /// One mirrored record by id.
    pub async fn record(&self, id: &RecordId) -> Option<PlayerRecord> {
        self.sync.mirror().get(id).await
    }

    /// Hash of the current snapshot, for convergence checks across
    /// viewers.
    pub async fn snapshot_hash(&self) -> SnapshotHash {
        self.sync.mirror().snapshot_hash().await
    }

    /// Watch sync health. `Stale` means the roster shows its last good
    /// data, not that it is empty.
    pub fn health(&self) -> watch::Receiver<SyncHealth> {
        self.sync.health()
    }

    /// Manual refresh; the retry path after a transient failure.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        self.sync.reload().await
    }

    /// Begin editing a record's profile fields, seeding the buffer from
    /// the mirror's current values. An edit already open on a different
    /// record is committed first.
    pub async fn start_edit(&mut self, id: &RecordId) -> Result<(), ViewError> {
        let record = self
            .sync
            .mirror()
            .get(id)
            .await
            .ok_or_else(|| ViewError::UnknownRecord(id.clone()))?;
        self.edit.start_edit(self.store.as_ref(), &record).await?;
        Ok(())
    }

    /// Buffer a name keystroke. Returns false when no edit is open.
    pub fn set_name(&mut self, value: impl Into<String>) -> bool {
        self.edit.set_name(value)
    }

    /// Buffer an account-tag keystroke. Returns false when no edit is
    /// open.
    pub fn set_riot_id(&mut self, value: impl Into<String>) -> bool {
        self.edit.set_riot_id(value)
    }

    /// Id of the record currently being edited, if any.
    pub fn editing_id(&self) -> Option<&RecordId> {
        self.edit.editing_id()
    }

    /// The open edit buffer, if any.
    pub fn edit_buffer(&self) -> Option<&FieldBuffer> {
        self.edit.buffer()
    }

    /// Finish the open edit: confirm and leave-the-field both end up
    /// here. Returns the written record, or `None` when nothing changed
    /// or no edit was open.
    pub async fn finish_edit(&mut self) -> Result<Option<PlayerRecord>, ViewError> {
        Ok(self.edit.commit(self.store.as_ref()).await?)
    }

    /// Write a rank change straight through to the store.
    ///
    /// Does not disturb an open profile edit on the same record; the two
    /// touch disjoint fields.
    pub async fn set_rank(&self, id: &RecordId, rank: Rank) -> Result<PlayerRecord, ViewError> {
        self.write(id, RosterUpdate::rank(rank)).await
    }

    /// Write a division change straight through to the store.
    pub async fn set_division(
        &self,
        id: &RecordId,
        division: impl Into<String>,
    ) -> Result<PlayerRecord, ViewError> {
        self.write(id, RosterUpdate::division(division)).await
    }

    async fn write(&self, id: &RecordId, update: RosterUpdate) -> Result<PlayerRecord, ViewError> {
        match self.store.update_fields(id, update).await {
            Ok(record) => Ok(record),
            Err(error) => {
                warn!(%id, %error, "store write failed");
                Err(error.into())
            }
        }
    }

    /// Display-asset URL for a record, using the configured template.
    pub fn icon_url_for(&self, record: &PlayerRecord) -> String {
        tier::icon_url_with(&self.config.icon_url_template, record.tier_id())
    }

    /// End the viewing session, releasing the subscription exactly once.
    ///
    /// Open edits are not committed; callers that want leave-the-field
    /// semantics call [`Self::finish_edit`] first.
    pub async fn close(self) {
        self.sync.stop().await;
        info!("board view closed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::store::memory::MemoryStore;

    fn demo_config() -> BoardConfig {
        BoardConfig {
            store_url: "memory://test".into(),
            store_key: "test-key".into(),
            ..BoardConfig::default()
        }
    }

    async fn seeded_store() -> (MemoryStore, RecordId, RecordId) {
        let store = MemoryStore::new();

        let mut ada = PlayerRecord::new(RecordId::new("p1"));
        ada.name = Some("Ada".into());
        ada.rank = Rank::Iron;
        ada.division = Some("1".into());
        let ada_id = store.insert(ada).await;

        let mut bo = PlayerRecord::new(RecordId::new("p2"));
        bo.name = Some("Bo".into());
        bo.rank = Rank::Silver;
        bo.division = Some("3".into());
        let bo_id = store.insert(bo).await;

        (store, ada_id, bo_id)
    }

    async fn open_view(store: &MemoryStore) -> BoardView {
        BoardView::open(demo_config(), Arc::new(store.clone()))
            .await
            .unwrap()
    }

    async fn wait_for<F>(view: &BoardView, mut satisfied: F) -> bool
    where
        F: FnMut(&[PlayerRecord]) -> bool,
    {
        for _ in 0..200 {
            if satisfied(&view.roster().await) {
                return true;
            }
            sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_open_requires_config() {
        let (store, _, _) = seeded_store().await;
        let result = BoardView::open(BoardConfig::default(), Arc::new(store)).await;
        assert!(matches!(
            result,
            Err(ViewError::Config(ConfigError::MissingStoreUrl))
        ));
    }

    #[tokio::test]
    async fn test_end_to_end_edit_scenario() {
        let (store, ada_id, _) = seeded_store().await;
        let mut view = open_view(&store).await;

        let ada = view.record(&ada_id).await.unwrap();
        assert_eq!(ada.tier_id(), 3);
        let before = ada.last_updated.unwrap();

        view.start_edit(&ada_id).await.unwrap();
        view.set_name("Ada K.");
        let written = view.finish_edit().await.unwrap().unwrap();

        assert_eq!(written.name.as_deref(), Some("Ada K."));
        assert_eq!(written.rank, Rank::Iron);
        assert_eq!(written.division.as_deref(), Some("1"));
        assert!(written.last_updated.unwrap() > before);

        view.close().await;
    }

    #[tokio::test]
    async fn test_edit_buffer_survives_unrelated_reload() {
        let (store, ada_id, bo_id) = seeded_store().await;
        let mut view = open_view(&store).await;

        view.start_edit(&ada_id).await.unwrap();
        view.set_name("Ada K.");

        // Another viewer writes a different record, pushing a reload
        // through our subscription.
        store
            .update_fields(&bo_id, RosterUpdate::rank(Rank::Diamond))
            .await
            .unwrap();
        let refreshed = wait_for(&view, |roster| {
            roster
                .iter()
                .any(|r| r.id == bo_id && r.rank == Rank::Diamond)
        })
        .await;
        assert!(refreshed, "mirror never saw the unrelated write");

        // The open buffer was not clobbered by the reload
        assert_eq!(view.edit_buffer().unwrap().name, "Ada K.");

        let written = view.finish_edit().await.unwrap().unwrap();
        assert_eq!(written.name.as_deref(), Some("Ada K."));

        view.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_disjoint_writes_converge() {
        let (store, ada_id, _) = seeded_store().await;
        let view_a = open_view(&store).await;
        let view_b = open_view(&store).await;

        // Near-simultaneous writes to disjoint fields of the same record
        let (rank_write, division_write) = tokio::join!(
            view_a.set_rank(&ada_id, Rank::Gold),
            view_b.set_division(&ada_id, "2"),
        );
        rank_write.unwrap();
        division_write.unwrap();

        for view in [&view_a, &view_b] {
            let converged = wait_for(view, |roster| {
                roster.iter().any(|r| {
                    r.id == ada_id && r.rank == Rank::Gold && r.division.as_deref() == Some("2")
                })
            })
            .await;
            assert!(converged, "a viewer missed one of the disjoint writes");
        }

        assert_eq!(view_a.snapshot_hash().await, view_b.snapshot_hash().await);

        view_a.close().await;
        view_b.close().await;
    }

    #[tokio::test]
    async fn test_rank_write_keeps_open_edit() {
        let (store, ada_id, _) = seeded_store().await;
        let mut view = open_view(&store).await;

        view.start_edit(&ada_id).await.unwrap();
        view.set_name("Ada K.");

        // The rank dropdown writes immediately without leaving edit mode
        view.set_rank(&ada_id, Rank::Platinum).await.unwrap();
        assert_eq!(view.editing_id(), Some(&ada_id));
        assert_eq!(view.edit_buffer().unwrap().name, "Ada K.");

        view.finish_edit().await.unwrap();
        let ada = wait_for(&view, |roster| {
            roster.iter().any(|r| {
                r.id == ada_id
                    && r.rank == Rank::Platinum
                    && r.name.as_deref() == Some("Ada K.")
            })
        })
        .await;
        assert!(ada, "rank and profile writes should both land");

        view.close().await;
    }

    #[tokio::test]
    async fn test_unknown_record_edit() {
        let (store, _, _) = seeded_store().await;
        let mut view = open_view(&store).await;
        let result = view.start_edit(&RecordId::new("ghost")).await;
        assert!(matches!(result, Err(ViewError::UnknownRecord(_))));
        view.close().await;
    }

    #[tokio::test]
    async fn test_icon_url_uses_configured_template() {
        let (store, ada_id, _) = seeded_store().await;
        let config = BoardConfig {
            icon_url_template: "/tiers/{id}.png".into(),
            ..demo_config()
        };
        let view = BoardView::open(config, Arc::new(store.clone())).await.unwrap();

        let ada = view.record(&ada_id).await.unwrap();
        assert_eq!(view.icon_url_for(&ada), "/tiers/3.png");

        view.close().await;
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_roster_visible() {
        let (store, ada_id, _) = seeded_store().await;
        let view = open_view(&store).await;

        store.set_read_failures(true);
        assert!(view.reload().await.is_err());

        // Stale-but-valid rows, not an empty board
        let roster = view.roster().await;
        assert_eq!(roster.len(), 2);
        assert!(roster.iter().any(|r| r.id == ada_id));

        store.set_read_failures(false);
        assert_eq!(view.reload().await.unwrap(), 2);

        view.close().await;
    }
}
