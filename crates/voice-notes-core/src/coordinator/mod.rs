mod session_state;
mod session_coordinator;

pub(crate) use session_coordinator::move_file;

pub use {
    session_coordinator::{PlaybackStarted, SessionCoordinator},
    session_state::SessionState,
};

/// Subdirectory of the data directory holding note audio.
pub(crate) const RECORDINGS_DIR: &str = "recordings";
