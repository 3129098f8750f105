//! Authoritative Store Boundary
//!
//! The roster's single source of truth lives behind [`RosterStore`]. The
//! engine only ever reads full snapshots and issues sparse field updates;
//! record creation and deletion belong to the store side. Change
//! notifications arrive over a broadcast feed and carry no payload the
//! engine relies on.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::broadcast;

use crate::core::rank::Rank;
use crate::core::tier;

pub mod memory;

// =============================================================================
// RECORD ID
// =============================================================================

/// Opaque stable record identifier, assigned by the store.
///
/// Never reused or mutated. Implements `Ord` so roster ordering is
/// deterministic (by id, never by notification arrival order).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PLAYER RECORD
// =============================================================================

/// One roster slot.
///
/// The closed shape of a store row, validated at the read boundary: an
/// unknown rank name deserializes to `Unranked` instead of rejecting the
/// record, and the division stays a raw label so out-of-range values reach
/// tier resolution unclamped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Stable identifier, immutable once created.
    pub id: RecordId,
    /// Display name. May be unset; display placeholders are presentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// In-game account tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riot_id: Option<String>,
    /// Competitive rank. Absent and unknown both read as `Unranked`.
    #[serde(default, deserialize_with = "lenient_rank")]
    pub rank: Rank,
    /// Division label, normally `"1"`..`"3"`. Unused for endpoint ranks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    /// Stamped by the store on every field write. Not settable by callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PlayerRecord {
    /// Fresh record with every mutable field unset.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            name: None,
            riot_id: None,
            rank: Rank::Unranked,
            division: None,
            last_updated: None,
        }
    }

    /// Tier id for this record's rank and division.
    #[inline]
    pub fn tier_id(&self) -> u32 {
        tier::resolve_rank(self.rank, self.division.as_deref())
    }

    /// Display-asset URL for this record's tier, default template.
    pub fn icon_url(&self) -> String {
        tier::icon_url(self.tier_id())
    }
}

/// Unknown rank names degrade to `Unranked` at the read boundary; `null`
/// and absent behave the same way.
fn lenient_rank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rank, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map_or(Rank::Unranked, Rank::from_name))
}

// =============================================================================
// PARTIAL UPDATE
// =============================================================================

/// Sparse field update. Absent fields are left untouched by the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New account tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riot_id: Option<String>,
    /// New rank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    /// New division label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
}

impl RosterUpdate {
    /// Update carrying only a rank change.
    pub fn rank(rank: Rank) -> Self {
        Self {
            rank: Some(rank),
            ..Self::default()
        }
    }

    /// Update carrying only a division change.
    pub fn division(division: impl Into<String>) -> Self {
        Self {
            division: Some(division.into()),
            ..Self::default()
        }
    }

    /// Update carrying the editable profile fields.
    pub fn profile(name: impl Into<String>, riot_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            riot_id: Some(riot_id.into()),
            ..Self::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.riot_id.is_none()
            && self.rank.is_none()
            && self.division.is_none()
    }
}

// =============================================================================
// CHANGE FEED
// =============================================================================

/// What kind of row change a notification describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// A change-feed notification.
///
/// The payload is advisory only: the sync engine treats every notification
/// as "reload everything", so missed, merged, or duplicated deliveries are
/// all safe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Kind of change.
    pub kind: ChangeKind,
    /// Row the change touched, if the feed knows it.
    pub id: Option<RecordId>,
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Transport or backend failure; the caller's snapshot stays valid.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// No record with the given id.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The store returned a payload the engine could not read.
    #[error("malformed record payload: {0}")]
    Malformed(String),

    /// The change feed could not be established.
    #[error("change feed rejected: {0}")]
    SubscriptionRefused(String),
}

/// The authoritative roster store.
///
/// Implemented by the external data service; [`memory::MemoryStore`] is the
/// process-local implementation backing tests and the demo binary.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Full roster snapshot, ordered by record id.
    async fn select_all(&self) -> Result<Vec<PlayerRecord>, StoreError>;

    /// Apply a sparse update to one record and stamp `last_updated`
    /// atomically with the write. Returns the record as written.
    async fn update_fields(
        &self,
        id: &RecordId,
        update: RosterUpdate,
    ) -> Result<PlayerRecord, StoreError>;

    /// Register for change notifications. Dropping the receiver releases
    /// the registration.
    fn subscribe(&self) -> Result<broadcast::Receiver<ChangeEvent>, StoreError>;
}
