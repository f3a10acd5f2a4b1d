use crate::{CoreResult, NoteError};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Requested frames per resampler call. Rubato may round this to fit the
/// rate ratio, so the actual size is read back from the resampler.
const CHUNK_SIZE: usize = 1024;

/// Mono sample-rate converter between the device rate and a file rate.
pub(crate) struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub(crate) fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_SIZE,
            2, // sub_chunks
            1, // mono
            FixedSync::Input,
        )
        .map_err(|e| NoteError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, "Resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Convert `samples` between rates, skipping the work when they match.
    #[track_caller]
    pub(crate) fn convert(samples: Vec<f32>, input_rate: u32, output_rate: u32) -> CoreResult<Vec<f32>> {
        if input_rate == output_rate || samples.is_empty() {
            return Ok(samples);
        }
        Self::new(input_rate, output_rate)?.resample(&samples)
    }

    #[track_caller]
    #[instrument(skip(self, samples), fields(input_len = samples.len()))]
    pub(crate) fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len = (samples.len() as f64 * f64::from(self.output_rate)
            / f64::from(self.input_rate))
        .round() as usize;
        let chunk_size = self.resampler.input_frames_next();
        let mut output = Vec::with_capacity(expected_len + self.resampler.output_frames_max());
        let mut output_chunk = vec![0.0f32; self.resampler.output_frames_max()];

        for chunk in samples.chunks(chunk_size) {
            // The last chunk is zero-padded; the tail is trimmed below.
            let mut input_chunk = chunk.to_vec();
            input_chunk.resize(chunk_size, 0.0);

            let input_adapter = InterleavedSlice::new(&input_chunk, 1, chunk_size).map_err(|e| {
                NoteError::ResamplingError {
                    reason: format!("Failed to create input adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

            let output_frames = output_chunk.len();
            let mut output_adapter = InterleavedSlice::new_mut(&mut output_chunk, 1, output_frames)
                .map_err(|e| NoteError::ResamplingError {
                    reason: format!("Failed to create output adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let (_, written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| NoteError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&output_chunk[..written]);
        }

        output.truncate(expected_len);

        debug!(
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled audio"
        );

        Ok(output)
    }
}
