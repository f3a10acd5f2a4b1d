//! Recording session contract over a platform capture backend.

use crate::{CoreResult, NoteError, RecordingQuality, audio::wav};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// What a backend hands back when capture stops.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutput {
    /// Finalized audio file, if one was produced.
    pub file: Option<PathBuf>,
    /// Recorded length according to the capture's own bookkeeping.
    pub recorded: Option<Duration>,
}

/// Platform microphone capture.
#[allow(async_fn_in_trait)]
pub trait RecordingBackend {
    /// Ask for microphone access. `false` means denied.
    async fn request_permission(&mut self) -> bool;

    /// Configure the input for `quality` and start capturing.
    async fn start_capture(&mut self, quality: RecordingQuality) -> CoreResult<()>;

    /// Stop capturing and finalize the audio file.
    async fn stop_capture(&mut self) -> CoreResult<CaptureOutput>;

    /// Read the duration of a finalized file from its header.
    async fn probe_duration(&self, path: &Path) -> CoreResult<Option<Duration>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || wav::probe_duration(&path))
            .await
            .map_err(|e| NoteError::RecordingFinalize {
                reason: format!("Duration probe task failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
    }
}

/// Handle for the live recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSession {
    /// Unique session ID for log correlation.
    pub id: Uuid,
    /// Quality the session was started with.
    pub quality: RecordingQuality,
    /// When capture started.
    pub started_at: Instant,
}

/// Result of a finalized recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClip {
    /// Location of the finalized (temporary) audio file.
    pub file_uri: PathBuf,
    /// Measured length, `None` when neither source could report it.
    pub duration_seconds: Option<f64>,
}

/// Owns the capture backend and enforces a single live session.
pub struct Recorder<B> {
    backend: B,
    live: Option<Uuid>,
}

impl<B: RecordingBackend> Recorder<B> {
    /// Wrap a capture backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: None,
        }
    }

    /// Whether a session is currently capturing.
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Request permission and start capturing at `quality`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` if microphone access is refused (nothing else is
    /// attempted), `SessionBusy` if a session is already live, or the
    /// backend's start error.
    #[instrument(skip(self))]
    pub async fn begin(&mut self, quality: RecordingQuality) -> CoreResult<RecordingSession> {
        if let Some(live) = self.live {
            return Err(NoteError::SessionBusy {
                reason: format!("recording {} is already live", live),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !self.backend.request_permission().await {
            warn!("Microphone permission denied");
            return Err(NoteError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.backend.start_capture(quality).await?;

        let session = RecordingSession {
            id: Uuid::new_v4(),
            quality,
            started_at: Instant::now(),
        };
        self.live = Some(session.id);

        info!(session_id = %session.id, ?quality, "Recording session started");

        Ok(session)
    }

    /// Stop capture and return the finalized file with its duration.
    ///
    /// The capture's own recorded time is preferred; the file header is only
    /// consulted when that is missing or zero.
    ///
    /// # Errors
    ///
    /// `RecordingFinalize` if no usable file was produced.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn end(&mut self, session: RecordingSession) -> CoreResult<RecordedClip> {
        if self.live != Some(session.id) {
            return Err(NoteError::NoActiveRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // The session is over whatever the backend reports.
        self.live = None;
        let output = self.backend.stop_capture().await?;

        let file_uri = match output.file {
            Some(file) if tokio::fs::try_exists(&file).await.unwrap_or(false) => file,
            Some(file) => {
                return Err(NoteError::RecordingFinalize {
                    reason: format!("capture reported {:?} but it does not exist", file),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            None => {
                return Err(NoteError::RecordingFinalize {
                    reason: "capture produced no file".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let duration = match output.recorded.filter(|d| !d.is_zero()) {
            Some(recorded) => Some(recorded),
            None => match self.backend.probe_duration(&file_uri).await {
                Ok(probed) => probed.filter(|d| !d.is_zero()),
                Err(e) => {
                    warn!(error = %e, "Could not read duration from file header");
                    None
                }
            },
        };

        info!(
            file = ?file_uri,
            duration = ?duration,
            wall_clock_ms = session.started_at.elapsed().as_millis(),
            "Recording session finalized"
        );

        Ok(RecordedClip {
            file_uri,
            duration_seconds: duration.map(|d| d.as_secs_f64()),
        })
    }
}
