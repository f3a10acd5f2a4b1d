mod note_store;

pub use note_store::NoteStore;

pub(crate) const NOTES_FILE: &str = "notes.json";
pub(crate) const SETTINGS_FILE: &str = "settings.json";
