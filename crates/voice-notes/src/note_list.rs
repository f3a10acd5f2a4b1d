//! Terminal rendering of the note list.

use voice_notes_core::{NoteId, PlaybackSpeed, VoiceNote};

use std::fmt::Write;

/// What the list view needs from the coordinator for one render.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListContext<'a> {
    /// Note currently playing.
    pub(crate) playing: Option<&'a NoteId>,
    /// Rate of the live or next playback.
    pub(crate) speed: PlaybackSpeed,
    /// Whether a recording is live.
    pub(crate) recording: bool,
}

/// Filtered, ordered view over the note list.
#[derive(Debug, Clone, Default)]
pub(crate) struct NoteListView {
    filter: String,
}

impl NoteListView {
    /// Replace the search filter. Blank clears it.
    pub(crate) fn set_filter(&mut self, query: &str) {
        self.filter = query.trim().to_string();
    }

    /// Notes matching the filter, in list order.
    pub(crate) fn visible<'a>(&self, notes: &'a [VoiceNote]) -> Vec<&'a VoiceNote> {
        notes.iter().filter(|note| note.matches(&self.filter)).collect()
    }

    /// Resolve a user reference: an exact id first, then a 1-based position
    /// in the visible list.
    pub(crate) fn resolve(&self, notes: &[VoiceNote], target: &str) -> Option<NoteId> {
        if let Some(note) = notes.iter().find(|note| note.id.as_str() == target) {
            return Some(note.id.clone());
        }
        let position = target.trim_start_matches('#').parse::<usize>().ok()?;
        self.visible(notes)
            .get(position.checked_sub(1)?)
            .map(|note| note.id.clone())
    }

    pub(crate) fn render(&self, notes: &[VoiceNote], context: ListContext<'_>) -> String {
        let visible = self.visible(notes);
        let mut out = String::new();

        if self.filter.is_empty() {
            let _ = writeln!(out, "Voice Notes ({})", notes.len());
        } else {
            let _ = writeln!(
                out,
                "Voice Notes ({} of {} matching {:?})",
                visible.len(),
                notes.len(),
                self.filter
            );
        }

        if context.recording {
            let _ = writeln!(out, "  ● Recording... type 'stop' to save");
        }

        if notes.is_empty() {
            let _ = writeln!(out, "  No voice notes yet. Type 'record' to start.");
        } else if visible.is_empty() {
            let _ = writeln!(out, "  No notes match {:?}.", self.filter);
        }

        for (index, note) in visible.iter().enumerate() {
            let _ = writeln!(out, "{}", row(index + 1, note, context));
        }

        out
    }
}

fn row(position: usize, note: &VoiceNote, context: ListContext<'_>) -> String {
    let playing = context.playing == Some(&note.id);
    let mut line = format!(
        "{} {:>2}. {}",
        if playing { "▶" } else { " " },
        position,
        note.local_date()
    );
    if let Some(duration) = format_duration(note.duration) {
        let _ = write!(line, "  {duration}");
    }
    let _ = write!(line, "  {}", note.display_title().unwrap_or("Untitled"));
    let _ = write!(line, "  [{}]", note.id);
    if playing {
        let _ = write!(line, "  playing at {}", context.speed);
    }
    line
}

/// Seconds to one decimal place, e.g. `3.2s`. Unknown durations render as
/// nothing.
pub(crate) fn format_duration(duration: Option<f64>) -> Option<String> {
    duration
        .filter(|seconds| seconds.is_finite())
        .map(|seconds| format!("{seconds:.1}s"))
}
