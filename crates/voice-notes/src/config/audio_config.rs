use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Microphone to record from (None = default input device).
    #[serde(default)]
    pub input_device: Option<String>,
    /// Speaker to play notes on (None = default output device).
    #[serde(default)]
    pub output_device: Option<String>,
}
