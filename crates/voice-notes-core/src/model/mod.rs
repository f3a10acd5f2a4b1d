mod note_id;
mod playback_speed;
mod recording_quality;
mod settings;
mod voice_note;

pub use {
    note_id::NoteId, playback_speed::PlaybackSpeed, recording_quality::RecordingQuality,
    settings::AppSettings, voice_note::VoiceNote,
};
