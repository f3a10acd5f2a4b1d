use crate::model::NoteId;

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// One recorded memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceNote {
    /// Unique, immutable identifier.
    pub id: NoteId,
    /// Location of the audio file.
    pub path: PathBuf,
    /// Creation time, fixed when recording stopped.
    pub date: DateTime<Utc>,
    /// Measured length in seconds. `None` means the length is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// User-assigned label. `None` and an empty string both mean untitled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl VoiceNote {
    /// Title if one is set and non-blank.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    /// Set or clear the title. Blank input clears it.
    pub fn set_title(&mut self, title: &str) {
        let title = title.trim();
        self.title = (!title.is_empty()).then(|| title.to_string());
    }

    /// Creation time formatted in local time for display and search.
    pub fn local_date(&self) -> String {
        self.date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Case-insensitive match of `query` against the title and local date.
    ///
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.local_date().to_lowercase().contains(&query)
            || self
                .display_title()
                .is_some_and(|title| title.to_lowercase().contains(&query))
    }
}
