//! Durable persistence of the note list and user settings.
//!
//! Each record is a JSON file in the data directory. Nothing is cached:
//! every load reads the file and every save rewrites it in full from the
//! caller's list.
//!
//! Storage errors carry the location of the public store operation that
//! failed.

use crate::{
    AppSettings, CoreResult, NoteError, VoiceNote,
    store::{NOTES_FILE, SETTINGS_FILE},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// JSON-file key-value store for notes and settings.
#[derive(Debug, Clone)]
pub struct NoteStore {
    data_dir: PathBuf,
}

impl NoteStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily
    /// on first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory holding the persisted records.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the persisted note list.
    ///
    /// Returns an empty list when nothing has been saved yet or when the
    /// stored list is unreadable. Corruption is logged, not surfaced.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Vec<VoiceNote> {
        match self.try_load_all().await {
            Ok(notes) => notes,
            Err(e) => {
                warn!(error = %e, "Note list unreadable, starting with an empty list");
                Vec::new()
            }
        }
    }

    /// Load the persisted note list, surfacing read and parse failures.
    #[instrument(skip(self))]
    pub async fn try_load_all(&self) -> CoreResult<Vec<VoiceNote>> {
        let notes: Option<Vec<VoiceNote>> = self
            .read_record(NOTES_FILE, Location::caller())
            .await?;
        let notes = notes.unwrap_or_default();

        debug!(count = notes.len(), "Notes loaded");

        Ok(notes)
    }

    /// Overwrite the persisted list with exactly `notes`, in the given order.
    #[instrument(skip(self, notes), fields(count = notes.len()))]
    pub async fn save_all(&self, notes: &[VoiceNote]) -> CoreResult<()> {
        self.write_record(NOTES_FILE, notes, Location::caller())
            .await
    }

    /// Load settings, falling back to defaults when absent or unreadable.
    ///
    /// Fields missing from the stored record take their default values.
    #[instrument(skip(self))]
    pub async fn load_settings(&self) -> AppSettings {
        match self
            .read_record::<AppSettings>(SETTINGS_FILE, Location::caller())
            .await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                info!("No settings found, using defaults");
                AppSettings::default()
            }
            Err(e) => {
                warn!(error = %e, "Settings unreadable, using defaults");
                AppSettings::default()
            }
        }
    }

    /// Overwrite the persisted settings record.
    #[instrument(skip(self))]
    pub async fn save_settings(&self, settings: &AppSettings) -> CoreResult<()> {
        self.write_record(SETTINGS_FILE, settings, Location::caller())
            .await
    }

    async fn read_record<T: DeserializeOwned>(
        &self,
        name: &str,
        caller: &'static Location<'static>,
    ) -> CoreResult<Option<T>> {
        let location = ErrorLocation::from(caller);
        let path = self.data_dir.join(name);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(NoteError::StorageRead {
                    path,
                    reason: e.to_string(),
                    location,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| NoteError::StorageRead {
                path,
                reason: format!("Failed to parse: {}", e),
                location,
            })
    }

    /// Atomic write: serialize to a temp file, sync, then rename over the
    /// record so a crash mid-write never leaves a truncated file behind.
    async fn write_record<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
        caller: &'static Location<'static>,
    ) -> CoreResult<()> {
        let path = self.data_dir.join(name);
        let write_error = |reason: String| NoteError::StorageWrite {
            path: path.clone(),
            reason,
            location: ErrorLocation::from(caller),
        };

        let contents = serde_json::to_vec_pretty(value)
            .map_err(|e| write_error(format!("Failed to serialize: {}", e)))?;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| write_error(format!("Failed to create data directory: {}", e)))?;

        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path)
            .await
            .map_err(|e| write_error(format!("Failed to create temp file: {}", e)))?;

        temp_file
            .write_all(&contents)
            .await
            .map_err(|e| write_error(format!("Failed to write temp file: {}", e)))?;

        temp_file
            .sync_all()
            .await
            .map_err(|e| write_error(format!("Failed to sync temp file: {}", e)))?;

        drop(temp_file);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| write_error(format!("Failed to rename temp file: {}", e)))?;

        debug!(path = ?path, bytes = contents.len(), "Record saved (atomic write)");

        Ok(())
    }
}
