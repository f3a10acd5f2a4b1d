use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Encoder quality for new recordings.
///
/// Only affects recordings started after the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordingQuality {
    /// Smaller file size, lower quality.
    Low,
    /// Balanced size and quality.
    Medium,
    /// Larger file size, best quality.
    #[default]
    High,
}

impl RecordingQuality {
    /// Sample rate the finalized file is encoded at.
    pub fn sample_rate(self) -> u32 {
        match self {
            RecordingQuality::Low => 16_000,
            RecordingQuality::Medium => 22_050,
            RecordingQuality::High => 44_100,
        }
    }

    /// PCM bit depth of the finalized file.
    pub fn bits_per_sample(self) -> u16 {
        match self {
            RecordingQuality::Low | RecordingQuality::Medium => 16,
            RecordingQuality::High => 24,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            RecordingQuality::Low => "Low Quality",
            RecordingQuality::Medium => "Medium Quality",
            RecordingQuality::High => "High Quality",
        }
    }
}

impl fmt::Display for RecordingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordingQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RecordingQuality::Low),
            "medium" => Ok(RecordingQuality::Medium),
            "high" => Ok(RecordingQuality::High),
            other => Err(format!("unknown recording quality: {other}")),
        }
    }
}
