//! Subscription Lifecycle and Reload Orchestration
//!
//! One [`SyncController`] per viewer. It subscribes to the store's change
//! feed, performs the initial load, and from then on turns every
//! notification burst into a single full reload of the mirror. Stopping the
//! controller is the one-and-only unsubscribe.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::mirror::RosterMirror;
use crate::store::{ChangeEvent, RosterStore, StoreError};

/// Health of the mirror relative to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncHealth {
    /// Last load succeeded; the mirror tracks the store.
    Live,
    /// Reloads are failing; the mirror holds its last good snapshot.
    Stale {
        /// Consecutive failed loads since the mirror was last live.
        failures: u32,
    },
}

/// Fatal synchronization startup errors.
///
/// Everything past startup is transient and surfaces through
/// [`SyncController::health`] instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The change feed could not be established at all.
    #[error("change feed subscription failed: {0}")]
    Subscribe(#[source] StoreError),
}

/// Owns one viewer's subscription and drives mirror reloads.
pub struct SyncController {
    store: Arc<dyn RosterStore>,
    mirror: RosterMirror,
    health_rx: watch::Receiver<SyncHealth>,
    shutdown_tx: watch::Sender<bool>,
    feed_task: JoinHandle<()>,
}

impl SyncController {
    /// Subscribe to the store and perform the initial load.
    ///
    /// A refused subscription is fatal. A failed initial load is not: it is
    /// logged, reported through [`Self::health`], and retried on the next
    /// notification like any other reload.
    pub async fn start(
        store: Arc<dyn RosterStore>,
        mirror: RosterMirror,
    ) -> Result<Self, SyncError> {
        let changes = store.subscribe().map_err(SyncError::Subscribe)?;

        let initial_health = match mirror.load(store.as_ref()).await {
            Ok(count) => {
                info!(records = count, "initial roster load complete");
                SyncHealth::Live
            }
            Err(error) => {
                warn!(%error, "initial roster load failed; mirror starts empty");
                SyncHealth::Stale { failures: 1 }
            }
        };

        let (health_tx, health_rx) = watch::channel(initial_health);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let feed_task = tokio::spawn(feed_loop(
            store.clone(),
            mirror.clone(),
            changes,
            health_tx,
            shutdown_rx,
        ));

        Ok(Self {
            store,
            mirror,
            health_rx,
            shutdown_tx,
            feed_task,
        })
    }

    /// The mirror this controller refreshes.
    pub fn mirror(&self) -> &RosterMirror {
        &self.mirror
    }

    /// Watch the mirror's health. Stale means "last good snapshot", never
    /// "empty".
    pub fn health(&self) -> watch::Receiver<SyncHealth> {
        self.health_rx.clone()
    }

    /// Manual refresh, sharing the failure policy of notification-driven
    /// reloads: on error the snapshot is retained and the error returned.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        self.mirror.load(self.store.as_ref()).await
    }

    /// Stop the feed task and release the subscription.
    ///
    /// Call exactly once when the viewing session ends; dropping without
    /// stopping leaks the subscription until the feed closes. A reload in
    /// flight is allowed to finish and its result discarded rather than
    /// cancelled.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.feed_task.await;
        info!("sync controller stopped");
    }
}

async fn feed_loop(
    store: Arc<dyn RosterStore>,
    mirror: RosterMirror,
    mut changes: broadcast::Receiver<ChangeEvent>,
    health_tx: watch::Sender<SyncHealth>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut failures = match *health_tx.borrow() {
        SyncHealth::Stale { failures } => failures,
        SyncHealth::Live => 0,
    };

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("shutdown requested; leaving feed loop");
                break;
            }
            received = changes.recv() => {
                match received {
                    Ok(event) => debug!(?event, "change notification"),
                    Err(RecvError::Lagged(skipped)) => {
                        // Lag just means we missed notifications, and the
                        // reload below resynchronizes regardless.
                        debug!(skipped, "change feed lagged");
                    }
                    Err(RecvError::Closed) => {
                        info!("change feed closed; leaving feed loop");
                        break;
                    }
                }

                // Coalesce the burst: drain everything already queued so a
                // write storm costs one reload, not one per notification.
                loop {
                    match changes.try_recv() {
                        Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                    }
                }

                match store.select_all().await {
                    Ok(records) => {
                        if *shutdown_rx.borrow() {
                            // The load ran to completion; a stop that raced
                            // it discards the result.
                            debug!("reload completed after stop; discarding");
                            break;
                        }
                        let count = mirror.replace(records).await;
                        failures = 0;
                        let _ = health_tx.send(SyncHealth::Live);
                        debug!(records = count, "mirror refreshed");
                    }
                    Err(error) => {
                        failures = failures.saturating_add(1);
                        warn!(%error, failures, "roster reload failed; keeping last snapshot");
                        let _ = health_tx.send(SyncHealth::Stale { failures });
                    }
                }
            }
        }
    }
}
