use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Voice note errors with source location tracking.
#[derive(Error, Debug)]
pub enum NoteError {
    /// Microphone access was refused.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture stopped without producing a usable audio file.
    #[error("Recording could not be finalized: {reason} {location}")]
    RecordingFinalize {
        /// Description of the finalize failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio file could not be loaded or played.
    #[error("Playback failed for {path:?}: {reason} {location}")]
    Playback {
        /// File that failed to play.
        path: PathBuf,
        /// Description of the playback failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persisted notes or settings could not be read or parsed.
    #[error("Failed to read {path:?}: {reason} {location}")]
    StorageRead {
        /// Record that failed to load.
        path: PathBuf,
        /// Description of the read failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persisted notes or settings could not be written.
    #[error("Failed to write {path:?}: {reason} {location}")]
    StorageWrite {
        /// Record that failed to save.
        path: PathBuf,
        /// Description of the write failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Backing audio file of a deleted note could not be removed.
    #[error("Failed to delete {path:?}: {source} {location}")]
    FileDelete {
        /// File left behind.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No note with the requested id exists.
    #[error("Note not found: {id} {location}")]
    NoteNotFound {
        /// Requested note id.
        id: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Another session already owns the audio device.
    #[error("Session busy: {reason} {location}")]
    SessionBusy {
        /// What is currently active.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A stop was requested but nothing is recording.
    #[error("No recording in progress {location}")]
    NoActiveRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl NoteError {
    /// Whether this failure should be shown to the user.
    ///
    /// Read failures are recovered locally by substituting defaults.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, NoteError::StorageRead { .. })
    }
}

impl From<std::io::Error> for NoteError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        NoteError::Io {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`NoteError`].
pub type Result<T> = std::result::Result<T, NoteError>;
