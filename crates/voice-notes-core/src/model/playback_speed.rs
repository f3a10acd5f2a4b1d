use std::fmt;

use serde::{Deserialize, Serialize};

/// Playback rate restricted to the supported speed steps.
///
/// Deserializing an arbitrary number snaps it to the nearest step, so a
/// hand-edited or out-of-range value never reaches the audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct PlaybackSpeed(f32);

impl PlaybackSpeed {
    /// Supported rates, in cycling order.
    pub const STEPS: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

    /// Normal speed.
    pub const NORMAL: PlaybackSpeed = PlaybackSpeed(1.0);

    /// Snap `rate` to the closest supported step.
    pub fn nearest(rate: f32) -> Self {
        if !rate.is_finite() {
            return Self::NORMAL;
        }
        let mut best = Self::STEPS[0];
        for step in Self::STEPS {
            if (step - rate).abs() < (best - rate).abs() {
                best = step;
            }
        }
        Self(best)
    }

    /// Next step, wrapping from the fastest back to the slowest.
    pub fn next(self) -> Self {
        let index = Self::STEPS
            .iter()
            .position(|&step| step == self.0)
            .unwrap_or(2);
        Self(Self::STEPS[(index + 1) % Self::STEPS.len()])
    }

    /// Rate multiplier.
    pub fn rate(self) -> f32 {
        self.0
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<f32> for PlaybackSpeed {
    fn from(rate: f32) -> Self {
        Self::nearest(rate)
    }
}

impl From<PlaybackSpeed> for f32 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.0
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}
