use crate::{
    AppCommand, AppError, AppResult, Intent,
    intent::HELP,
    note_list::{ListContext, NoteListView, format_duration},
};

use voice_notes_core::{
    Completion, NoteError, NoteId, PlaybackBackend, RecordingBackend, SessionCoordinator,
    VoiceNote,
};

use std::{io::Write, panic::Location};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Main application state.
///
/// Owns the coordinator and processes one command at a time, so each
/// intent's full async chain finishes before the next one is received.
pub struct App<R, P, W> {
    pub(crate) coordinator: SessionCoordinator<R, P>,
    pub(crate) view: NoteListView,
    pub(crate) out: W,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl<R, P, W> App<R, P, W>
where
    R: RecordingBackend,
    P: PlaybackBackend,
    W: Write,
{
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(note_count = self.coordinator.notes().len(), "Voice Notes starting");

        self.render()?;

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AppCommand::Intent(Intent::Quit) | AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                AppCommand::Intent(intent) => {
                    if let Err(e) = self.handle_intent(intent).await {
                        self.report(&e);
                    }
                }
                AppCommand::Rejected { reason } => {
                    writeln!(self.out, "{}. Type 'help' for commands.", reason)?;
                }
                AppCommand::PlaybackFinished { session_id } => {
                    let note_id = self.coordinator.playing_note().cloned();
                    if self.coordinator.on_playback_completed(session_id).await {
                        if let Some(note) = note_id.and_then(|id| self.coordinator.note(&id)) {
                            writeln!(self.out, "Finished playing {}.", describe(note))?;
                        }
                        self.render()?;
                    }
                }
            }
        }

        self.shutdown().await;

        let _ = self.shutdown_tx.send(true);
        info!("Voice Notes shut down successfully");

        Ok(())
    }

    async fn handle_intent(&mut self, intent: Intent) -> AppResult<()> {
        debug!(intent = ?intent, "Handling intent");

        match intent {
            Intent::Record => {
                self.coordinator.start_recording().await?;
                writeln!(self.out, "Recording... type 'stop' to save.")?;
            }
            Intent::Stop => {
                let result = self.coordinator.stop_recording().await;
                if let Ok(note) = &result {
                    writeln!(self.out, "Saved {}.", describe(note))?;
                }
                // A failed save still lists the note, so render either way.
                self.render()?;
                result?;
            }
            Intent::Play { target } => {
                let note_id = self.resolve(&target)?;
                let started = self.coordinator.play(&note_id).await?;
                self.forward_completion(started.session_id, started.completion);
                self.render()?;
            }
            Intent::StopPlayback => {
                self.coordinator.stop_playback().await;
                self.render()?;
            }
            Intent::Delete { target } => {
                let note_id = self.resolve(&target)?;
                let result = self.coordinator.delete(&note_id).await;
                self.render()?;
                result?;
            }
            Intent::Rename { target, title } => {
                let note_id = self.resolve(&target)?;
                self.coordinator.rename(&note_id, &title).await?;
                self.render()?;
            }
            Intent::CycleSpeed => {
                let speed = self.coordinator.cycle_speed()?;
                writeln!(self.out, "Playback speed: {}", speed)?;
            }
            Intent::Search { query } => {
                self.view.set_filter(&query);
                self.render()?;
            }
            Intent::List => {
                self.view.set_filter("");
                self.render()?;
            }
            Intent::SetQuality(quality) => {
                self.coordinator.set_recording_quality(quality).await?;
                writeln!(self.out, "Recording quality: {}", quality)?;
            }
            Intent::SetDefaultSpeed(speed) => {
                self.coordinator.set_default_speed(speed).await?;
                writeln!(self.out, "Default playback speed: {}", speed)?;
            }
            Intent::ShowSettings => {
                let settings = *self.coordinator.settings();
                writeln!(self.out, "Recording quality: {}", settings.recording_quality)?;
                writeln!(
                    self.out,
                    "Default playback speed: {}",
                    settings.default_playback_speed
                )?;
                writeln!(
                    self.out,
                    "Recordings: {}",
                    self.coordinator.recordings_dir().display()
                )?;
            }
            Intent::Help => {
                writeln!(self.out, "{}", HELP)?;
            }
            Intent::Quit => {}
        }

        Ok(())
    }

    #[track_caller]
    fn resolve(&self, target: &str) -> AppResult<NoteId> {
        self.view
            .resolve(self.coordinator.notes(), target)
            .ok_or_else(|| {
                AppError::from(NoteError::NoteNotFound {
                    id: target.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            })
    }

    /// Relay end-of-media back into the command loop so the transition runs
    /// on this task.
    fn forward_completion(&self, session_id: Uuid, completion: Completion) {
        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            if completion.wait().await
                && command_tx
                    .send(AppCommand::PlaybackFinished { session_id })
                    .await
                    .is_err()
            {
                debug!(session_id = %session_id, "App stopped before playback finished");
            }
        });
    }

    fn render(&mut self) -> AppResult<()> {
        let context = ListContext {
            playing: self.coordinator.playing_note(),
            speed: self.coordinator.current_speed(),
            recording: self.coordinator.is_recording(),
        };
        let list = self.view.render(self.coordinator.notes(), context);
        write!(self.out, "{}", list)?;
        self.out.flush()?;
        Ok(())
    }

    /// Print a failure once and log it. Recovered failures are only logged.
    fn report(&mut self, e: &AppError) {
        if !e.is_user_visible() {
            warn!(error = %e, "Recovered error");
            return;
        }

        error!(error = %e, "Request failed");
        let message = match e {
            AppError::Notes { source, .. } => user_message(source),
            other => other.to_string(),
        };
        let _ = writeln!(self.out, "Error: {}", message);
    }

    /// Keep a recording in progress and release the output before exiting.
    async fn shutdown(&mut self) {
        if self.coordinator.is_recording() {
            match self.coordinator.stop_recording().await {
                Ok(note) => info!(note_id = %note.id, "Saved recording on exit"),
                Err(e) => error!(error = %e, "Failed to save recording on exit"),
            }
        }
        self.coordinator.stop_playback().await;
    }
}

fn describe(note: &VoiceNote) -> String {
    let title = note.display_title().unwrap_or("Untitled");
    match format_duration(note.duration) {
        Some(duration) => format!("{} ({}) [{}]", title, duration, note.id),
        None => format!("{} [{}]", title, note.id),
    }
}

/// Short message for the terminal; the full error with its location goes to
/// the log.
pub(crate) fn user_message(e: &NoteError) -> String {
    match e {
        NoteError::PermissionDenied { .. } => "Microphone access is required".to_string(),
        NoteError::RecordingFinalize { reason, .. } => {
            format!("The recording could not be saved: {}", reason)
        }
        NoteError::Playback { reason, .. } => format!("Could not play the note: {}", reason),
        NoteError::StorageRead { reason, .. } => format!("Could not read saved data: {}", reason),
        NoteError::StorageWrite { reason, .. } => {
            format!("Could not save the note list: {}", reason)
        }
        NoteError::FileDelete { source, .. } => {
            format!("The audio file could not be removed: {}", source)
        }
        NoteError::NoteNotFound { id, .. } => format!("No note {:?}", id),
        NoteError::SessionBusy { reason, .. } => format!("Busy: {}", reason),
        NoteError::NoActiveRecording { .. } => "Nothing is recording".to_string(),
        NoteError::DeviceError { reason, .. } => format!("Audio device problem: {}", reason),
        NoteError::ResamplingError { reason, .. } => {
            format!("Audio conversion failed: {}", reason)
        }
        NoteError::Io { source, .. } => source.to_string(),
    }
}
