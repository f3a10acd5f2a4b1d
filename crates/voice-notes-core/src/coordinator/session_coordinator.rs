//! Session coordinator: the single owner of recording/playback state.
//!
//! Every transition takes `&mut self`, so one intent's full async chain
//! completes before the next can start. Callers that receive intents from
//! several sources funnel them through one task (see the binary's command
//! loop) rather than sharing the coordinator.

use crate::{
    AppSettings, CoreResult, NoteError, NoteId, NoteStore, PlaybackSpeed, RecordingQuality,
    VoiceNote,
    audio::{
        Completion, PlaybackBackend, PlaybackSession, Player, Recorder, RecordingBackend,
        RecordingSession,
    },
    coordinator::{RECORDINGS_DIR, SessionState},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

enum Active {
    Idle,
    Recording(RecordingSession),
    Playing {
        note_id: NoteId,
        session: PlaybackSession,
    },
}

/// Returned by [`SessionCoordinator::play`].
#[derive(Debug)]
pub struct PlaybackStarted {
    /// Note now playing.
    pub note_id: NoteId,
    /// Playback session ID; pass it back to
    /// [`SessionCoordinator::on_playback_completed`].
    pub session_id: Uuid,
    /// Resolves once when the note plays to the end.
    pub completion: Completion,
}

/// Enforces at most one recording and one playback, and keeps the in-memory
/// note list in step with the [`NoteStore`].
pub struct SessionCoordinator<R, P> {
    recorder: Recorder<R>,
    player: Player<P>,
    store: NoteStore,
    recordings_dir: PathBuf,
    notes: Vec<VoiceNote>,
    settings: AppSettings,
    speed: PlaybackSpeed,
    /// Default chosen during a playback, applied once it ends.
    pending_speed: Option<PlaybackSpeed>,
    active: Active,
}

impl<R: RecordingBackend, P: PlaybackBackend> SessionCoordinator<R, P> {
    /// Create an idle coordinator with an empty list. Call
    /// [`load`](Self::load) to read persisted state.
    pub fn new(recording: R, playback: P, store: NoteStore) -> Self {
        let recordings_dir = store.data_dir().join(RECORDINGS_DIR);
        Self {
            recorder: Recorder::new(recording),
            player: Player::new(playback),
            store,
            recordings_dir,
            notes: Vec::new(),
            settings: AppSettings::default(),
            speed: PlaybackSpeed::default(),
            pending_speed: None,
            active: Active::Idle,
        }
    }

    /// Read notes and settings, and make sure the recordings directory
    /// exists.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> CoreResult<()> {
        fs::create_dir_all(&self.recordings_dir).await?;

        self.notes = self.store.load_all().await;
        self.settings = self.store.load_settings().await;
        self.speed = self.settings.default_playback_speed;

        info!(
            note_count = self.notes.len(),
            quality = ?self.settings.recording_quality,
            speed = %self.speed,
            "Coordinator loaded"
        );

        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        match &self.active {
            Active::Idle => SessionState::Idle,
            Active::Recording(session) => SessionState::Recording {
                session_id: session.id,
                started_at: session.started_at,
            },
            Active::Playing { note_id, session } => SessionState::Playing {
                note_id: note_id.clone(),
                session_id: session.id,
            },
        }
    }

    /// Notes in insertion order.
    pub fn notes(&self) -> &[VoiceNote] {
        &self.notes
    }

    /// Look up a note by id.
    pub fn note(&self, id: &NoteId) -> Option<&VoiceNote> {
        self.notes.iter().find(|note| note.id == *id)
    }

    /// Current settings.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Rate used for the live and the next playback.
    pub fn current_speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Note currently playing, if any.
    pub fn playing_note(&self) -> Option<&NoteId> {
        match &self.active {
            Active::Playing { note_id, .. } => Some(note_id),
            _ => None,
        }
    }

    /// Whether a recording is live.
    pub fn is_recording(&self) -> bool {
        matches!(self.active, Active::Recording(_))
    }

    /// Directory where finalized note audio is stored.
    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    /// Borrow the recorder.
    pub fn recorder(&self) -> &Recorder<R> {
        &self.recorder
    }

    /// Borrow the player.
    pub fn player(&self) -> &Player<P> {
        &self.player
    }

    /// Idle → Recording. Stops a live playback first.
    ///
    /// # Errors
    ///
    /// `SessionBusy` if already recording, `PermissionDenied` if microphone
    /// access is refused.
    #[instrument(skip(self))]
    pub async fn start_recording(&mut self) -> CoreResult<()> {
        if let Active::Recording(session) = &self.active {
            return Err(NoteError::SessionBusy {
                reason: format!("recording {} is already in progress", session.id),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.stop_playback().await;

        let session = self.recorder.begin(self.settings.recording_quality).await?;
        info!(session_id = %session.id, "Recording started");
        self.active = Active::Recording(session);

        Ok(())
    }

    /// Recording → Idle: finalize, move the file into storage, append the
    /// note and persist the list.
    ///
    /// # Errors
    ///
    /// `RecordingFinalize` if no playable file could be produced; the note is
    /// discarded. `StorageWrite` if the list could not be saved; the note is
    /// kept in memory and [`flush`](Self::flush) retries the save.
    #[instrument(skip(self))]
    pub async fn stop_recording(&mut self) -> CoreResult<VoiceNote> {
        let session = match std::mem::replace(&mut self.active, Active::Idle) {
            Active::Recording(session) => session,
            other => {
                self.active = other;
                return Err(NoteError::NoActiveRecording {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let clip = self.recorder.end(session).await?;

        let created = Utc::now();
        let id = NoteId::unique_from(created, self.notes.iter().map(|note| &note.id));
        let extension = clip
            .file_uri
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("wav")
            .to_string();
        let path = self.recordings_dir.join(format!("note_{}.{}", id, extension));

        if let Err(e) = move_file(&clip.file_uri, &path).await {
            error!(from = ?clip.file_uri, to = ?path, error = %e, "Failed to move recording into storage");
            let _ = fs::remove_file(&clip.file_uri).await;
            return Err(NoteError::RecordingFinalize {
                reason: format!("Failed to move recording into storage: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let note = VoiceNote {
            id,
            path,
            date: created,
            duration: clip.duration_seconds,
            title: None,
        };
        self.notes.push(note.clone());

        info!(
            note_id = %note.id,
            duration = ?note.duration,
            session_id = %session.id,
            "Recording saved"
        );

        self.store.save_all(&self.notes).await?;

        Ok(note)
    }

    /// Start playing `note_id` at the current speed, stopping any other
    /// playback first.
    ///
    /// # Errors
    ///
    /// `NoteNotFound`, `SessionBusy` while recording, or `Playback` if the
    /// file cannot be loaded. The coordinator is idle after any error.
    #[instrument(skip(self))]
    pub async fn play(&mut self, note_id: &NoteId) -> CoreResult<PlaybackStarted> {
        if self.is_recording() {
            return Err(NoteError::SessionBusy {
                reason: "cannot play while recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let path = self
            .note(note_id)
            .map(|note| note.path.clone())
            .ok_or_else(|| NoteError::NoteNotFound {
                id: note_id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.stop_playback().await;

        let (session, completion) = self.player.start(&path, self.speed).await?;
        let started = PlaybackStarted {
            note_id: note_id.clone(),
            session_id: session.id,
            completion,
        };

        info!(note_id = %note_id, session_id = %session.id, speed = %self.speed, "Playback started");
        self.active = Active::Playing {
            note_id: note_id.clone(),
            session,
        };

        Ok(started)
    }

    /// Playing → Idle. No-op when nothing is playing.
    #[instrument(skip(self))]
    pub async fn stop_playback(&mut self) {
        if !matches!(self.active, Active::Playing { .. }) {
            return;
        }
        if let Active::Playing { note_id, session } =
            std::mem::replace(&mut self.active, Active::Idle)
        {
            self.player.stop(Some(&session)).await;
            self.apply_pending_speed();
            info!(note_id = %note_id, session_id = %session.id, "Playback stopped");
        }
    }

    /// Route an end-of-media notification.
    ///
    /// Returns `true` if it belonged to the live session and the coordinator
    /// went idle; stale notifications are ignored.
    #[instrument(skip(self))]
    pub async fn on_playback_completed(&mut self, session_id: Uuid) -> bool {
        let matches_live =
            matches!(&self.active, Active::Playing { session, .. } if session.id == session_id);
        if !matches_live {
            debug!("Ignoring completion for a session that is no longer live");
            return false;
        }

        if let Active::Playing { note_id, session } =
            std::mem::replace(&mut self.active, Active::Idle)
        {
            self.player.stop(Some(&session)).await;
            self.apply_pending_speed();
            info!(note_id = %note_id, "Playback finished");
        }
        true
    }

    /// Delete a note and its audio file.
    ///
    /// Stops the note's playback first. File deletion and list persistence
    /// are both attempted; a missing file is not an error.
    ///
    /// # Errors
    ///
    /// `NoteNotFound`, or after both steps ran: `StorageWrite` if the list
    /// could not be saved, otherwise `FileDelete` if the file could not be
    /// removed. The note is gone from the in-memory list either way.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, note_id: &NoteId) -> CoreResult<()> {
        let index = self
            .notes
            .iter()
            .position(|note| note.id == *note_id)
            .ok_or_else(|| NoteError::NoteNotFound {
                id: note_id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if self.playing_note() == Some(note_id) {
            self.stop_playback().await;
        }

        let path = self.notes[index].path.clone();
        let file_result = match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?path, "Audio file already gone");
                Ok(())
            }
            Err(source) => {
                warn!(path = ?path, error = %source, "Failed to delete audio file");
                Err(NoteError::FileDelete {
                    path,
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        };

        self.notes.remove(index);
        let save_result = self.store.save_all(&self.notes).await;
        if let Err(e) = &save_result {
            error!(error = %e, "Failed to persist note list after delete");
        }

        info!(note_id = %note_id, "Note deleted");

        save_result.and(file_result)
    }

    /// Set or clear the title of `note_id`. Nothing else about the note, or
    /// any other note, changes.
    ///
    /// # Errors
    ///
    /// `NoteNotFound` or `StorageWrite`.
    #[instrument(skip(self))]
    pub async fn rename(&mut self, note_id: &NoteId, title: &str) -> CoreResult<VoiceNote> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id == *note_id)
            .ok_or_else(|| NoteError::NoteNotFound {
                id: note_id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        note.set_title(title);
        let renamed = note.clone();

        self.store.save_all(&self.notes).await?;

        info!(note_id = %note_id, title = ?renamed.title, "Note renamed");

        Ok(renamed)
    }

    /// Advance to the next speed and apply it to a live playback.
    ///
    /// # Errors
    ///
    /// Propagates the backend's rate-change error; the new speed is kept.
    #[instrument(skip(self))]
    pub fn cycle_speed(&mut self) -> CoreResult<PlaybackSpeed> {
        self.speed = self.speed.next();
        self.pending_speed = None;
        if let Active::Playing { session, .. } = &self.active {
            self.player.set_rate(session, self.speed)?;
        }

        info!(speed = %self.speed, "Playback speed changed");

        Ok(self.speed)
    }

    /// Change the quality used by subsequent recordings.
    ///
    /// # Errors
    ///
    /// `StorageWrite` if the settings could not be saved.
    #[instrument(skip(self))]
    pub async fn set_recording_quality(&mut self, quality: RecordingQuality) -> CoreResult<()> {
        self.settings.recording_quality = quality;
        self.store.save_settings(&self.settings).await
    }

    /// Change the default speed. It seeds the next playback; a live one keeps
    /// its rate and the new default takes over when it ends.
    ///
    /// # Errors
    ///
    /// `StorageWrite` if the settings could not be saved.
    #[instrument(skip(self))]
    pub async fn set_default_speed(&mut self, speed: PlaybackSpeed) -> CoreResult<()> {
        self.settings.default_playback_speed = speed;
        if matches!(self.active, Active::Playing { .. }) {
            self.pending_speed = Some(speed);
        } else {
            self.speed = speed;
        }
        self.store.save_settings(&self.settings).await
    }

    /// Persist the in-memory list, e.g. after a failed save.
    ///
    /// # Errors
    ///
    /// `StorageWrite` if the list could not be saved.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> CoreResult<()> {
        self.store.save_all(&self.notes).await
    }

    fn apply_pending_speed(&mut self) {
        if let Some(speed) = self.pending_speed.take() {
            debug!(speed = %speed, "Applying default speed chosen during playback");
            self.speed = speed;
        }
    }
}

/// Rename into place, copying when source and destination are on different
/// filesystems.
pub(crate) async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).await?;
    }
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            debug!(error = %rename_error, "Rename failed, falling back to copy");
            if let Err(copy_error) = fs::copy(from, to).await {
                let _ = fs::remove_file(to).await;
                return Err(copy_error);
            }
            if let Err(remove_error) = fs::remove_file(from).await {
                let _ = fs::remove_file(to).await;
                return Err(remove_error);
            }
            Ok(())
        }
    }
}
