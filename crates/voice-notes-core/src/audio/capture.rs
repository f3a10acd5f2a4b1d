use crate::{
    CoreResult, NoteError, RecordingQuality,
    audio::{CaptureOutput, RecordingBackend, Resampler, device, wav},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Longest single memo kept in memory, in seconds.
///
/// Capture stops accumulating past this point; the recording is still
/// finalized with everything captured so far.
pub(crate) const MAX_CAPTURE_SECONDS: usize = 60 * 30;

/// Mono frame cap for a stream running at `sample_rate`.
pub(crate) fn max_capture_frames(sample_rate: u32) -> usize {
    (sample_rate as usize).saturating_mul(MAX_CAPTURE_SECONDS)
}

/// Raw mono audio taken off the input stream.
pub(crate) struct CapturedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

/// One open input stream writing into a shared mono buffer.
pub(crate) struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<Vec<f32>>>,
    frames: Arc<AtomicU64>,
    max_frames: usize,
    /// Signals the audio callback to stop writing. Set before the stream is
    /// dropped so no in-flight callback writes after `stop()` takes the lock.
    shutdown: Arc<AtomicBool>,
}

impl AudioCapturer {
    #[track_caller]
    #[instrument]
    pub(crate) fn new(device_name: Option<&str>) -> CoreResult<Self> {
        let device = device::input_device(device_name)?;

        let config = device
            .default_input_config()
            .map_err(|e| NoteError::DeviceError {
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        let max_frames = max_capture_frames(config.sample_rate());

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(Vec::new())),
            frames: Arc::new(AtomicU64::new(0)),
            max_frames,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    #[track_caller]
    #[instrument(skip(self))]
    pub(crate) fn start(&mut self) -> CoreResult<()> {
        let samples = Arc::clone(&self.samples);
        let frames = Arc::clone(&self.frames);
        let shutdown = Arc::clone(&self.shutdown);
        let channels = usize::from(self.config.channels.max(1));
        let max_frames = self.max_frames;

        self.shutdown.store(false, Ordering::Release);
        self.frames.store(0, Ordering::Release);
        samples
            .lock()
            .map_err(|e| NoteError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned lock still holds valid samples.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    let room = max_frames.saturating_sub(buf.len());
                    let mono = wav::downmix(data, channels);
                    let kept = mono.len().min(room);
                    buf.extend_from_slice(&mono[..kept]);
                    frames.fetch_add(kept as u64, Ordering::AcqRel);
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| NoteError::DeviceError {
                reason: format!("Failed to build input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| NoteError::DeviceError {
            reason: format!("Failed to start input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    pub(crate) fn stop(&mut self) -> CoreResult<CapturedAudio> {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Let a callback that raced the flag finish before reading.
            std::thread::sleep(Duration::from_millis(5));
            info!("Audio capture stopped");
        }

        let samples = std::mem::take(&mut *self.samples.lock().map_err(|e| {
            NoteError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?);

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(CapturedAudio {
            samples,
            sample_rate: self.config.sample_rate,
        })
    }

    /// Frames captured so far, from the callback's own count.
    pub(crate) fn recorded(&self) -> Duration {
        let frames = self.frames.load(Ordering::Acquire);
        if self.config.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(frames as f64 / f64::from(self.config.sample_rate))
    }
}

/// Microphone capture through cpal, finalized to a WAV file.
pub struct CpalRecordingBackend {
    device_name: Option<String>,
    temp_dir: PathBuf,
    capturer: Option<AudioCapturer>,
    quality: RecordingQuality,
}

impl CpalRecordingBackend {
    /// Capture from `device_name` (or the default input), writing finalized
    /// files into `temp_dir` until the coordinator moves them.
    pub fn new(device_name: Option<String>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            device_name,
            temp_dir: temp_dir.into(),
            capturer: None,
            quality: RecordingQuality::default(),
        }
    }
}

impl RecordingBackend for CpalRecordingBackend {
    /// Desktop hosts have no permission prompt; access counts as granted
    /// when an input device can be opened.
    #[instrument(skip(self))]
    async fn request_permission(&mut self) -> bool {
        if self.capturer.is_some() {
            return true;
        }
        match AudioCapturer::new(self.device_name.as_deref()) {
            Ok(capturer) => {
                self.capturer = Some(capturer);
                true
            }
            Err(e) => {
                warn!(error = %e, "Microphone unavailable");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn start_capture(&mut self, quality: RecordingQuality) -> CoreResult<()> {
        let mut capturer = match self.capturer.take() {
            Some(capturer) => capturer,
            None => AudioCapturer::new(self.device_name.as_deref())?,
        };
        capturer.start()?;
        self.capturer = Some(capturer);
        self.quality = quality;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop_capture(&mut self) -> CoreResult<CaptureOutput> {
        let Some(capturer) = self.capturer.as_mut() else {
            return Ok(CaptureOutput::default());
        };

        let recorded = capturer.recorded();
        let captured = capturer.stop()?;
        // Reopen the device on the next recording so hot-plugged devices are
        // picked up.
        self.capturer = None;

        if captured.samples.is_empty() {
            warn!("No audio captured");
            return Ok(CaptureOutput {
                file: None,
                recorded: Some(recorded),
            });
        }

        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let file = self.temp_dir.join(format!("recording_{}.wav", Uuid::new_v4()));
        let quality = self.quality;
        let target = file.clone();

        tokio::task::spawn_blocking(move || {
            let samples =
                Resampler::convert(captured.samples, captured.sample_rate, quality.sample_rate())?;
            wav::encode(&target, &samples, quality)
        })
        .await
        .map_err(|e| NoteError::RecordingFinalize {
            reason: format!("Encoder task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

        Ok(CaptureOutput {
            file: Some(file),
            recorded: Some(recorded),
        })
    }
}
