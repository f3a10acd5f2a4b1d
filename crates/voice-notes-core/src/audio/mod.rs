pub(crate) mod capture;
mod device;
mod output;
mod playback;
mod recording;
mod resampler;
pub(crate) mod wav;

pub(crate) use resampler::Resampler;

pub use {
    capture::CpalRecordingBackend,
    output::CpalPlaybackBackend,
    playback::{Completion, PlaybackBackend, PlaybackSession, Player},
    recording::{CaptureOutput, RecordedClip, Recorder, RecordingBackend, RecordingSession},
};

#[cfg(test)]
pub(crate) use output::sample_at;
