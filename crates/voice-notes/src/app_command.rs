use crate::Intent;

use uuid::Uuid;

/// Commands delivered to the main application loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// A parsed user request.
    Intent(Intent),
    /// Input that did not parse as a command.
    Rejected {
        /// Why the input was rejected.
        reason: String,
    },
    /// A playback reached the end of its media.
    PlaybackFinished {
        /// Session ID of the playback that finished.
        session_id: Uuid,
    },
    /// Request application shutdown.
    Shutdown,
}
