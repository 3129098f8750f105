//! # Roster Board Engine
//!
//! Synchronization and tier-resolution engine behind a shared competitive
//! roster board. Many viewers watch and edit the same small player list; the
//! authoritative copy lives in an external store, and each viewer keeps a
//! local mirror consistent through a push-based change feed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ROSTER BOARD                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure primitives (no I/O)                  │
//! │  ├── rank.rs     - Closed rank enumeration                   │
//! │  └── tier.rs     - (rank, division) -> tier id resolution    │
//! │                                                              │
//! │  store/          - Authoritative store boundary              │
//! │  ├── mod.rs      - Records, partial updates, store trait     │
//! │  └── memory.rs   - In-memory store with change feed          │
//! │                                                              │
//! │  sync/           - Per-viewer synchronization                │
//! │  ├── mirror.rs   - Local roster snapshot                     │
//! │  ├── controller.rs - Subscription lifecycle + reloads        │
//! │  └── edit.rs     - Edit-session state machine                │
//! │                                                              │
//! │  config.rs       - Store connection configuration            │
//! │  view.rs         - One viewer session (mirror + edits)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Model
//!
//! The engine is **eventually consistent** by construction:
//! - Every change notification triggers a full, idempotent reload of the
//!   mirror, so duplicated, merged, or lost-and-retried notifications are
//!   all safe (at-least-once delivery is sufficient).
//! - Concurrent writes from different viewers resolve last-write-wins at
//!   the store, per field update.
//! - An open edit buffer shadows its record's mutable fields and is never
//!   overwritten by a reload; it wins over the mirror until committed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod store;
pub mod sync;
pub mod view;

// Re-export commonly used types
pub use config::{BoardConfig, ConfigError};
pub use core::rank::Rank;
pub use core::tier::{icon_url, resolve, resolve_rank, DIVISION_COUNT, FALLBACK_TIER_ID};
pub use store::memory::MemoryStore;
pub use store::{
    ChangeEvent, ChangeKind, PlayerRecord, RecordId, RosterStore, RosterUpdate, StoreError,
};
pub use sync::edit::{EditSession, FieldBuffer};
pub use sync::{RosterMirror, SyncController, SyncError, SyncHealth};
pub use view::{BoardView, ViewError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
