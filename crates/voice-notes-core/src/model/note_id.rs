use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque note identifier, stable for the note's lifetime.
///
/// Generated from the creation time in milliseconds. Creation is user-paced,
/// so collisions only happen when two notes are stopped within the same
/// millisecond; [`NoteId::unique_from`] bumps the value until it is free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from `created_at` that is not in `taken`.
    pub fn unique_from<'a>(
        created_at: DateTime<Utc>,
        taken: impl Iterator<Item = &'a NoteId> + Clone,
    ) -> Self {
        let mut millis = created_at.timestamp_millis();
        loop {
            let candidate = NoteId(millis.to_string());
            if !taken.clone().any(|id| *id == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
