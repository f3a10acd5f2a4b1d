//! In-memory backends and a shared output buffer for driving the app loop.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::{App, AppCommand, NoteListView};

use voice_notes_core::{
    CaptureOutput, CoreResult, NoteError, NoteStore, PlaybackBackend, PlaybackSpeed,
    RecordingBackend, RecordingQuality, SessionCoordinator,
};

use std::{
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, oneshot, watch};

/// Captures "audio" as a placeholder file with a fixed recorded length.
pub(crate) struct FakeRecording {
    pub(crate) granted: bool,
    temp_dir: PathBuf,
}

impl FakeRecording {
    pub(crate) fn new(temp_dir: &Path) -> Self {
        Self {
            granted: true,
            temp_dir: temp_dir.to_path_buf(),
        }
    }
}

impl RecordingBackend for FakeRecording {
    async fn request_permission(&mut self) -> bool {
        self.granted
    }

    async fn start_capture(&mut self, _quality: RecordingQuality) -> CoreResult<()> {
        Ok(())
    }

    async fn stop_capture(&mut self) -> CoreResult<CaptureOutput> {
        std::fs::create_dir_all(&self.temp_dir).unwrap();
        let file = self
            .temp_dir
            .join(format!("capture_{}.wav", uuid::Uuid::new_v4()));
        std::fs::write(&file, b"RIFF").unwrap();
        Ok(CaptureOutput {
            file: Some(file),
            recorded: Some(Duration::from_millis(3200)),
        })
    }
}

/// Plays instantly: the completion is sent as soon as playback starts, unless
/// `hold` is set.
#[derive(Default)]
pub(crate) struct FakePlayback {
    pub(crate) hold: bool,
    pub(crate) held: Option<oneshot::Sender<()>>,
}

impl PlaybackBackend for FakePlayback {
    async fn load_and_play(
        &mut self,
        path: &Path,
        _rate: PlaybackSpeed,
        completion: oneshot::Sender<()>,
    ) -> CoreResult<()> {
        if !path.exists() {
            return Err(NoteError::Playback {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if self.hold {
            self.held = Some(completion);
        } else {
            let _ = completion.send(());
        }
        Ok(())
    }

    fn set_rate(&mut self, _rate: PlaybackSpeed) -> CoreResult<()> {
        Ok(())
    }

    async fn stop(&mut self) {
        self.held = None;
    }
}

/// Cloneable `Write` sink the test can read while the app owns a handle.
#[derive(Clone, Default)]
pub(crate) struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    pub(crate) fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Poll until `needle` has been written.
    pub(crate) async fn wait_for(&self, needle: &str) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !self.text().contains(needle) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{needle:?} never printed; output:\n{}", self.text()));
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub(crate) type TestApp = App<FakeRecording, FakePlayback, SharedOutput>;

pub(crate) struct Harness {
    pub(crate) app: TestApp,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) shutdown_rx: watch::Receiver<bool>,
    pub(crate) out: SharedOutput,
}

/// An app over `dir` whose backends are configured by the callbacks.
pub(crate) async fn harness(
    dir: &Path,
    configure_recording: impl FnOnce(&mut FakeRecording),
    playback: FakePlayback,
) -> Harness {
    let mut recording = FakeRecording::new(&dir.join("capture"));
    configure_recording(&mut recording);
    let mut coordinator = SessionCoordinator::new(recording, playback, NoteStore::new(dir));
    coordinator.load().await.unwrap();

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let out = SharedOutput::default();

    let app = App {
        coordinator,
        view: NoteListView::default(),
        out: out.clone(),
        command_tx: command_tx.clone(),
        command_rx,
        shutdown_tx,
    };

    Harness {
        app,
        command_tx,
        shutdown_rx,
        out,
    }
}
