use crate::NoteId;

use std::time::Instant;

use uuid::Uuid;

/// Observable state of the session coordinator.
///
/// Recording and playing are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing is capturing or playing.
    Idle,
    /// A recording session is live.
    Recording {
        /// Recording session ID.
        session_id: Uuid,
        /// When capture started.
        started_at: Instant,
    },
    /// A note is playing.
    Playing {
        /// Note being played.
        note_id: NoteId,
        /// Playback session ID, matched against completion notifications.
        session_id: Uuid,
    },
}

impl SessionState {
    /// Whether the coordinator is idle.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}
