//! WAV encoding and decoding for note audio files.

use crate::{CoreResult, NoteError, RecordingQuality};

use std::{panic::Location, path::Path, time::Duration};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Mono audio decoded from a note file.
#[derive(Debug, Clone)]
pub(crate) struct DecodedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

impl DecodedAudio {
    pub(crate) fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }
}

/// Write mono `samples` (already at the quality's rate) as integer PCM.
#[track_caller]
#[instrument(skip(samples), fields(sample_count = samples.len()))]
pub(crate) fn encode(path: &Path, samples: &[f32], quality: RecordingQuality) -> CoreResult<()> {
    let caller = Location::caller();
    let finalize_error = |e: hound::Error| NoteError::RecordingFinalize {
        reason: format!("Failed to encode {:?}: {}", path, e),
        location: ErrorLocation::from(caller),
    };

    let bits = quality.bits_per_sample();
    let spec = WavSpec {
        channels: 1,
        sample_rate: quality.sample_rate(),
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(finalize_error)?;
    let scale = ((1_i64 << (bits - 1)) - 1) as f32;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * scale).round();
        if bits == 16 {
            writer.write_sample(value as i16).map_err(finalize_error)?;
        } else {
            writer.write_sample(value as i32).map_err(finalize_error)?;
        }
    }

    writer.finalize().map_err(finalize_error)?;

    debug!(path = ?path, sample_rate = spec.sample_rate, bits, "WAV written");

    Ok(())
}

/// Read the duration recorded in the file header without decoding samples.
///
/// Returns `None` for an empty or rate-less file.
#[track_caller]
pub(crate) fn probe_duration(path: &Path) -> CoreResult<Option<Duration>> {
    let reader = WavReader::open(path).map_err(|e| NoteError::RecordingFinalize {
        reason: format!("Failed to read header of {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let spec = reader.spec();
    let frames = reader.duration();

    if spec.sample_rate == 0 || frames == 0 {
        return Ok(None);
    }

    Ok(Some(Duration::from_secs_f64(
        f64::from(frames) / f64::from(spec.sample_rate),
    )))
}

/// Decode any PCM or float WAV to mono f32.
#[track_caller]
#[instrument]
pub(crate) fn decode(path: &Path) -> CoreResult<DecodedAudio> {
    let caller = Location::caller();
    let playback_error = |reason: String| NoteError::Playback {
        path: path.to_path_buf(),
        reason,
        location: ErrorLocation::from(caller),
    };

    let mut reader =
        WavReader::open(path).map_err(|e| playback_error(format!("Failed to open: {}", e)))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| playback_error(format!("Failed to decode: {}", e)))?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| playback_error(format!("Failed to decode: {}", e)))?
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        downmix(&interleaved, channels)
    };

    debug!(
        sample_rate = spec.sample_rate,
        channels,
        frames = samples.len(),
        "WAV decoded"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Average interleaved frames to mono.
pub(crate) fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
