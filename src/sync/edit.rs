//! Edit-Session State Machine
//!
//! Two states per viewer: Viewing and Editing. While a record is being
//! edited, its mutable profile fields live in a local buffer that shadows
//! the mirror; reloads triggered by other viewers' writes never touch it.
//! Every path out of Editing funnels through [`EditSession::commit`], so
//! leaving the field and an explicit confirm behave identically.

use tracing::debug;

use crate::store::{PlayerRecord, RecordId, RosterStore, RosterUpdate, StoreError};

/// Buffered mutable profile fields of one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldBuffer {
    /// Display name being typed.
    pub name: String,
    /// Account tag being typed.
    pub riot_id: String,
}

impl FieldBuffer {
    /// Seed a buffer from a record's current values; unset fields seed as
    /// empty strings.
    pub fn seed_from(record: &PlayerRecord) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            riot_id: record.riot_id.clone().unwrap_or_default(),
        }
    }
}

enum EditState {
    Viewing,
    Editing {
        id: RecordId,
        /// Buffer contents at the moment editing started; commit compares
        /// against this to skip writes that would change nothing.
        seed: FieldBuffer,
        buffer: FieldBuffer,
    },
}

/// Per-viewer edit session. At most one record is in Editing state at a
/// time.
#[derive(Default)]
pub struct EditSession {
    state: EditState,
}

impl Default for EditState {
    fn default() -> Self {
        EditState::Viewing
    }
}

impl EditSession {
    /// Start in Viewing state.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a record is being edited.
    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Id of the record being edited, if any.
    pub fn editing_id(&self) -> Option<&RecordId> {
        match &self.state {
            EditState::Editing { id, .. } => Some(id),
            EditState::Viewing => None,
        }
    }

    /// The open buffer, if any.
    pub fn buffer(&self) -> Option<&FieldBuffer> {
        match &self.state {
            EditState::Editing { buffer, .. } => Some(buffer),
            EditState::Viewing => None,
        }
    }

    /// Open an edit on `record`, seeding the buffer from its current
    /// values.
    ///
    /// If a *different* record's edit is open it is committed first (its
    /// written record is returned); a failed commit keeps the old edit
    /// open and does not start the new one. Re-starting the record already
    /// being edited keeps the buffer as typed.
    pub async fn start_edit(
        &mut self,
        store: &dyn RosterStore,
        record: &PlayerRecord,
    ) -> Result<Option<PlayerRecord>, StoreError> {
        if self.editing_id() == Some(&record.id) {
            return Ok(None);
        }

        let committed = if self.is_editing() {
            self.commit(store).await?
        } else {
            None
        };

        let seed = FieldBuffer::seed_from(record);
        debug!(id = %record.id, "edit started");
        self.state = EditState::Editing {
            id: record.id.clone(),
            buffer: seed.clone(),
            seed,
        };
        Ok(committed)
    }

    /// Replace the buffered name. Returns false when nothing is being
    /// edited.
    pub fn set_name(&mut self, value: impl Into<String>) -> bool {
        match &mut self.state {
            EditState::Editing { buffer, .. } => {
                buffer.name = value.into();
                true
            }
            EditState::Viewing => false,
        }
    }

    /// Replace the buffered account tag. Returns false when nothing is
    /// being edited.
    pub fn set_riot_id(&mut self, value: impl Into<String>) -> bool {
        match &mut self.state {
            EditState::Editing { buffer, .. } => {
                buffer.riot_id = value.into();
                true
            }
            EditState::Viewing => false,
        }
    }

    /// Commit the open edit and return to Viewing.
    ///
    /// Writes the buffered fields through the store, which stamps
    /// `last_updated` and triggers the next change notification. A buffer
    /// identical to its seed skips the write. In Viewing state this is a
    /// no-op. A failed write re-opens the edit so the typed input is never
    /// lost.
    pub async fn commit(
        &mut self,
        store: &dyn RosterStore,
    ) -> Result<Option<PlayerRecord>, StoreError> {
        match std::mem::take(&mut self.state) {
            EditState::Viewing => Ok(None),
            EditState::Editing { id, seed, buffer } => {
                if buffer == seed {
                    debug!(%id, "edit unchanged; skipping write");
                    return Ok(None);
                }

                let update = RosterUpdate::profile(buffer.name.clone(), buffer.riot_id.clone());
                match store.update_fields(&id, update).await {
                    Ok(written) => {
                        debug!(%id, "edit committed");
                        Ok(Some(written))
                    }
                    Err(error) => {
                        self.state = EditState::Editing { id, seed, buffer };
                        Err(error)
                    }
                }
            }
        }
    }
}
