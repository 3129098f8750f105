//! Per-Viewer Synchronization
//!
//! Keeps one viewer's local roster mirror consistent with the authoritative
//! store. All consistency here is **eventual**: the engine reacts to change
//! notifications with full idempotent reloads and makes no promises about
//! observing intermediate states between rapid writes.

pub mod controller;
pub mod edit;
pub mod mirror;

pub use controller::{SyncController, SyncError, SyncHealth};
pub use edit::{EditSession, FieldBuffer};
pub use mirror::{RosterMirror, SnapshotHash};
