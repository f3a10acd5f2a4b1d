//! Playback session contract over a platform output backend.

use crate::{CoreResult, PlaybackSpeed};

use std::path::{Path, PathBuf};

use tokio::sync::oneshot;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Platform audio output.
#[allow(async_fn_in_trait)]
pub trait PlaybackBackend {
    /// Load `path` and start playing at `rate`.
    ///
    /// `completion` must be sent exactly once when playback reaches the end
    /// of the media, and dropped unsent when playback is stopped manually.
    async fn load_and_play(
        &mut self,
        path: &Path,
        rate: PlaybackSpeed,
        completion: oneshot::Sender<()>,
    ) -> CoreResult<()>;

    /// Change the rate of the current playback without moving its position.
    fn set_rate(&mut self, rate: PlaybackSpeed) -> CoreResult<()>;

    /// Halt playback and release the output. Must tolerate being called
    /// when nothing is playing.
    async fn stop(&mut self);
}

/// Handle for the live playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    /// Unique session ID, used to match completion notifications.
    pub id: Uuid,
    /// File being played.
    pub path: PathBuf,
}

/// Single-shot end-of-media notification for one playback session.
#[derive(Debug)]
pub struct Completion {
    session_id: Uuid,
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Session this notification belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Wait for the session to end. `true` when it played to the end,
    /// `false` when it was stopped first.
    pub async fn wait(self) -> bool {
        self.rx.await.is_ok()
    }
}

/// Owns the output backend and enforces a single live session.
pub struct Player<B> {
    backend: B,
    live: Option<Uuid>,
}

impl<B: PlaybackBackend> Player<B> {
    /// Wrap an output backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: None,
        }
    }

    /// Whether a session is currently playing.
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start playing `file_uri` at `rate`, stopping any live session first.
    ///
    /// # Errors
    ///
    /// `Playback` if the file cannot be loaded.
    #[instrument(skip(self))]
    pub async fn start(
        &mut self,
        file_uri: &Path,
        rate: PlaybackSpeed,
    ) -> CoreResult<(PlaybackSession, Completion)> {
        if self.live.take().is_some() {
            self.backend.stop().await;
        }

        let (tx, rx) = oneshot::channel();
        self.backend.load_and_play(file_uri, rate, tx).await?;

        let session = PlaybackSession {
            id: Uuid::new_v4(),
            path: file_uri.to_path_buf(),
        };
        self.live = Some(session.id);

        info!(session_id = %session.id, %rate, "Playback session started");

        Ok((
            session.clone(),
            Completion {
                session_id: session.id,
                rx,
            },
        ))
    }

    /// Change the speed of `session` if it is still the live one.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub fn set_rate(&mut self, session: &PlaybackSession, rate: PlaybackSpeed) -> CoreResult<()> {
        if self.live != Some(session.id) {
            debug!("Rate change for a session that is no longer live ignored");
            return Ok(());
        }
        self.backend.set_rate(rate)
    }

    /// Stop `session` and release the output. A `None` or stale handle is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn stop(&mut self, session: Option<&PlaybackSession>) {
        let Some(session) = session else {
            return;
        };
        if self.live != Some(session.id) {
            return;
        }
        self.live = None;
        self.backend.stop().await;
        info!(session_id = %session.id, "Playback session stopped");
    }
}
