//! Voice Notes Core Library
//!
//! Record, persist and replay short audio notes. The [`SessionCoordinator`]
//! owns the single recording/playback state, wraps the platform capture and
//! output backends, and keeps the note list in step with the [`NoteStore`].
//!
//! # Example
//!
//! ```no_run
//! use voice_notes_core::{
//!     CoreResult, CpalPlaybackBackend, CpalRecordingBackend, NoteStore, SessionCoordinator,
//! };
//!
//! use std::time::Duration;
//!
//! async fn record_memo() -> CoreResult<()> {
//!     let store = NoteStore::new("/tmp/voice-notes");
//!     let recording = CpalRecordingBackend::new(None, std::env::temp_dir());
//!     let playback = CpalPlaybackBackend::new(None);
//!     let mut coordinator = SessionCoordinator::new(recording, playback, store);
//!     coordinator.load().await?;
//!
//!     coordinator.start_recording().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     let note = coordinator.stop_recording().await?;
//!
//!     let started = coordinator.play(&note.id).await?;
//!     if started.completion.wait().await {
//!         coordinator.on_playback_completed(started.session_id).await;
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod coordinator;
mod error;
mod model;
mod store;

pub use {
    audio::{
        CaptureOutput, Completion, CpalPlaybackBackend, CpalRecordingBackend, PlaybackBackend,
        PlaybackSession, Player, RecordedClip, Recorder, RecordingBackend, RecordingSession,
    },
    coordinator::{PlaybackStarted, SessionCoordinator, SessionState},
    error::{NoteError, Result as CoreResult},
    model::{AppSettings, NoteId, PlaybackSpeed, RecordingQuality, VoiceNote},
    store::NoteStore,
};
