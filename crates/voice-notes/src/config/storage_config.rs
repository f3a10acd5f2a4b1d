use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where notes, settings and recordings are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory (None = platform data directory).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}
