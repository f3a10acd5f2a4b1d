use crate::model::{PlaybackSpeed, RecordingQuality};

use serde::{Deserialize, Serialize};

/// Process-wide user settings.
///
/// Missing fields in persisted data fall back to their defaults, so new
/// settings can be added without a migration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    /// Encoder quality for new recordings.
    pub recording_quality: RecordingQuality,
    /// Initial rate for new playback sessions.
    pub default_playback_speed: PlaybackSpeed,
}
