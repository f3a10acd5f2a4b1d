//! Fake capture and output backends that record what the coordinator asks
//! of them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    CaptureOutput, CoreResult, NoteError, NoteStore, PlaybackBackend, PlaybackSpeed,
    RecordingBackend, RecordingQuality, SessionCoordinator, audio::wav,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    RecordStart(RecordingQuality),
    RecordStop,
    DurationRead,
    PlayStart(PathBuf),
    PlayStop {
        path: PathBuf,
        file_existed: bool,
    },
    Rate(f32),
}

#[derive(Default)]
pub(crate) struct EventLogState {
    pub(crate) events: Vec<Event>,
    pub(crate) live_recordings: usize,
    pub(crate) live_playbacks: usize,
    pub(crate) max_live_recordings: usize,
    pub(crate) max_live_playbacks: usize,
    pub(crate) overlapped: bool,
    completion: Option<oneshot::Sender<()>>,
    playing: Option<PathBuf>,
}

impl EventLogState {
    fn track(&mut self) {
        self.max_live_recordings = self.max_live_recordings.max(self.live_recordings);
        self.max_live_playbacks = self.max_live_playbacks.max(self.live_playbacks);
        if self.live_recordings > 0 && self.live_playbacks > 0 {
            self.overlapped = true;
        }
    }
}

/// Shared view into both fakes.
#[derive(Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<EventLogState>>);

impl EventLog {
    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, EventLogState> {
        self.0.lock().unwrap()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Simulate the output reaching the end of the media.
    pub(crate) fn finish_playback(&self) -> bool {
        let mut state = self.lock();
        match state.completion.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

pub(crate) struct FakeRecorder {
    pub(crate) granted: bool,
    pub(crate) produce_file: bool,
    /// Length of the WAV written on stop.
    pub(crate) file_seconds: f64,
    /// What the capture's own bookkeeping reports.
    pub(crate) recorded: Option<Duration>,
    temp_dir: PathBuf,
    quality: RecordingQuality,
    log: EventLog,
}

impl FakeRecorder {
    pub(crate) fn new(temp_dir: &Path, log: &EventLog) -> Self {
        Self {
            granted: true,
            produce_file: true,
            file_seconds: 0.5,
            recorded: Some(Duration::from_millis(500)),
            temp_dir: temp_dir.to_path_buf(),
            quality: RecordingQuality::default(),
            log: log.clone(),
        }
    }
}

impl RecordingBackend for FakeRecorder {
    async fn request_permission(&mut self) -> bool {
        self.granted
    }

    async fn start_capture(&mut self, quality: RecordingQuality) -> CoreResult<()> {
        let mut state = self.log.lock();
        state.events.push(Event::RecordStart(quality));
        state.live_recordings += 1;
        state.track();
        self.quality = quality;
        Ok(())
    }

    async fn stop_capture(&mut self) -> CoreResult<CaptureOutput> {
        {
            let mut state = self.log.lock();
            state.events.push(Event::RecordStop);
            state.live_recordings -= 1;
        }

        if !self.produce_file {
            return Ok(CaptureOutput {
                file: None,
                recorded: self.recorded,
            });
        }

        std::fs::create_dir_all(&self.temp_dir).unwrap();
        let file = self
            .temp_dir
            .join(format!("capture_{}.wav", uuid::Uuid::new_v4()));
        let frames = (self.file_seconds * f64::from(self.quality.sample_rate())) as usize;
        wav::encode(&file, &vec![0.1; frames], self.quality)?;

        Ok(CaptureOutput {
            file: Some(file),
            recorded: self.recorded,
        })
    }

    async fn probe_duration(&self, path: &Path) -> CoreResult<Option<Duration>> {
        self.log.lock().events.push(Event::DurationRead);
        wav::probe_duration(path)
    }
}

pub(crate) struct FakePlayer {
    log: EventLog,
}

impl FakePlayer {
    pub(crate) fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
        }
    }
}

impl PlaybackBackend for FakePlayer {
    async fn load_and_play(
        &mut self,
        path: &Path,
        rate: PlaybackSpeed,
        completion: oneshot::Sender<()>,
    ) -> CoreResult<()> {
        if !path.exists() {
            return Err(NoteError::Playback {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut state = self.log.lock();
        state.events.push(Event::PlayStart(path.to_path_buf()));
        state.events.push(Event::Rate(rate.rate()));
        state.live_playbacks += 1;
        state.completion = Some(completion);
        state.playing = Some(path.to_path_buf());
        state.track();
        Ok(())
    }

    fn set_rate(&mut self, rate: PlaybackSpeed) -> CoreResult<()> {
        self.log.lock().events.push(Event::Rate(rate.rate()));
        Ok(())
    }

    async fn stop(&mut self) {
        let mut state = self.log.lock();
        if let Some(path) = state.playing.take() {
            let file_existed = path.exists();
            state.events.push(Event::PlayStop { path, file_existed });
            state.live_playbacks -= 1;
        }
        // Dropping the sender resolves the receiver as "stopped".
        state.completion = None;
    }
}

pub(crate) type TestCoordinator = SessionCoordinator<FakeRecorder, FakePlayer>;

/// A loaded coordinator over `dir`, plus the event log shared by its backends.
pub(crate) async fn coordinator(dir: &Path) -> (TestCoordinator, EventLog) {
    coordinator_with(dir, |_| {}).await
}

pub(crate) async fn coordinator_with(
    dir: &Path,
    configure: impl FnOnce(&mut FakeRecorder),
) -> (TestCoordinator, EventLog) {
    let log = EventLog::default();
    let mut recorder = FakeRecorder::new(&dir.join("tmp"), &log);
    configure(&mut recorder);
    let player = FakePlayer::new(&log);
    let mut coordinator = SessionCoordinator::new(recorder, player, NoteStore::new(dir));
    coordinator.load().await.unwrap();
    (coordinator, log)
}
