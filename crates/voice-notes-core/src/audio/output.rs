use crate::{
    CoreResult, NoteError, PlaybackSpeed,
    audio::{PlaybackBackend, device, wav},
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};

use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument};

struct ActiveOutput {
    stream: Stream,
    rate: Arc<AtomicU32>,
    stopped: Arc<AtomicBool>,
}

/// Speaker playback of WAV notes through cpal.
///
/// The whole file is decoded up front; the output callback walks it with a
/// fractional cursor so the rate can change mid-playback without a seek.
pub struct CpalPlaybackBackend {
    device_name: Option<String>,
    active: Option<ActiveOutput>,
}

impl CpalPlaybackBackend {
    /// Play through `device_name`, or the default output.
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            active: None,
        }
    }
}

/// Linearly interpolated sample at fractional `position`.
pub(crate) fn sample_at(samples: &[f32], position: f64) -> Option<f32> {
    let index = position.floor() as usize;
    let current = *samples.get(index)?;
    let next = samples.get(index + 1).copied().unwrap_or(current);
    let frac = (position - index as f64) as f32;
    Some(current + (next - current) * frac)
}

impl PlaybackBackend for CpalPlaybackBackend {
    #[instrument(skip(self, completion))]
    async fn load_and_play(
        &mut self,
        path: &Path,
        rate: PlaybackSpeed,
        completion: oneshot::Sender<()>,
    ) -> CoreResult<()> {
        self.stop().await;

        let caller = Location::caller();
        let playback_error = |reason: String| NoteError::Playback {
            path: path.to_path_buf(),
            reason,
            location: ErrorLocation::from(caller),
        };

        let owned = path.to_path_buf();
        let decoded = tokio::task::spawn_blocking(move || wav::decode(&owned))
            .await
            .map_err(|e| playback_error(format!("Decoder task failed: {}", e)))??;

        if decoded.samples.is_empty() {
            return Err(playback_error("file contains no audio".to_string()));
        }

        let device = device::output_device(self.device_name.as_deref())
            .map_err(|e| playback_error(e.to_string()))?;
        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| playback_error(format!("Failed to get output config: {}", e)))?
            .into();

        let channels = usize::from(config.channels.max(1));
        let source_step = f64::from(decoded.sample_rate) / f64::from(config.sample_rate.max(1));
        let duration = decoded.duration();
        let samples = decoded.samples;

        let rate_bits = Arc::new(AtomicU32::new(rate.rate().to_bits()));
        let stopped = Arc::new(AtomicBool::new(false));
        let callback_rate = Arc::clone(&rate_bits);
        let callback_stopped = Arc::clone(&stopped);
        let mut cursor = 0.0f64;
        let mut completion = Some(completion);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if callback_stopped.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }
                    let speed = f64::from(f32::from_bits(callback_rate.load(Ordering::Acquire)));
                    for frame in data.chunks_mut(channels) {
                        match sample_at(&samples, cursor) {
                            Some(value) => {
                                frame.fill(value);
                                cursor += speed * source_step;
                            }
                            None => {
                                frame.fill(0.0);
                                if let Some(tx) = completion.take() {
                                    let _ = tx.send(());
                                }
                            }
                        }
                    }
                },
                |err| {
                    error!("Audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| playback_error(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| playback_error(format!("Failed to start output stream: {}", e)))?;

        info!(
            device_id = ?device.id(),
            output_rate = config.sample_rate,
            duration_ms = duration.as_millis() as u64,
            "Audio playback started"
        );

        self.active = Some(ActiveOutput {
            stream,
            rate: rate_bits,
            stopped,
        });

        Ok(())
    }

    fn set_rate(&mut self, rate: PlaybackSpeed) -> CoreResult<()> {
        if let Some(active) = &self.active {
            active.rate.store(rate.rate().to_bits(), Ordering::Release);
            debug!(%rate, "Playback rate changed");
        }
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.stopped.store(true, Ordering::Release);
            // Dropping the stream drops the unsent completion sender.
            drop(active.stream);
            debug!("Audio playback released");
        }
    }
}
