//! User requests typed at the prompt.

use voice_notes_core::{PlaybackSpeed, RecordingQuality};

use std::str::FromStr;

/// Command reference printed by `help`.
pub(crate) const HELP: &str = "\
Commands:
  record                  start recording
  stop                    stop recording and save the note
  play <note>             play a note (id or list number)
  pause | stop-playback   stop playback
  delete <note>           delete a note and its audio
  rename <note> <title>   set a title (empty clears it)
  speed                   cycle playback speed
  search <text>           filter by title or date (empty clears)
  list                    show all notes
  quality <low|medium|high>
  default-speed <rate>    one of 0.5, 0.75, 1, 1.25, 1.5, 2
  settings                show current settings
  help                    show this help
  quit";

/// One user request.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Start recording.
    Record,
    /// Stop recording and save.
    Stop,
    /// Play a note by id or list position.
    Play {
        /// Note id or 1-based position in the visible list.
        target: String,
    },
    /// Stop playback.
    StopPlayback,
    /// Delete a note.
    Delete {
        /// Note id or 1-based position in the visible list.
        target: String,
    },
    /// Set or clear a note's title.
    Rename {
        /// Note id or 1-based position in the visible list.
        target: String,
        /// New title; empty clears it.
        title: String,
    },
    /// Advance to the next playback speed.
    CycleSpeed,
    /// Filter the list.
    Search {
        /// Query; empty clears the filter.
        query: String,
    },
    /// Clear the filter and show every note.
    List,
    /// Change the recording quality.
    SetQuality(RecordingQuality),
    /// Change the default playback speed.
    SetDefaultSpeed(PlaybackSpeed),
    /// Print settings.
    ShowSettings,
    /// Print the command reference.
    Help,
    /// Exit.
    Quit,
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "record" | "r" => Ok(Intent::Record),
            "stop" | "s" => Ok(Intent::Stop),
            "play" | "p" => Ok(Intent::Play {
                target: required(rest, "play <note>")?,
            }),
            "pause" | "stop-playback" => Ok(Intent::StopPlayback),
            "delete" | "rm" => Ok(Intent::Delete {
                target: required(rest, "delete <note>")?,
            }),
            "rename" => {
                let (target, title) = match rest.split_once(char::is_whitespace) {
                    Some((target, title)) => (target, title.trim()),
                    None => (rest, ""),
                };
                Ok(Intent::Rename {
                    target: required(target, "rename <note> <title>")?,
                    title: title.to_string(),
                })
            }
            "speed" => Ok(Intent::CycleSpeed),
            "search" | "find" => Ok(Intent::Search {
                query: rest.to_string(),
            }),
            "list" | "ls" => Ok(Intent::List),
            "quality" => rest.parse().map(Intent::SetQuality),
            "default-speed" => parse_speed(rest).map(Intent::SetDefaultSpeed),
            "settings" => Ok(Intent::ShowSettings),
            "help" | "?" => Ok(Intent::Help),
            "quit" | "exit" | "q" => Ok(Intent::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn required(argument: &str, usage: &str) -> Result<String, String> {
    if argument.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(argument.to_string())
    }
}

/// Accept only the supported steps; arbitrary rates are not rounded.
fn parse_speed(argument: &str) -> Result<PlaybackSpeed, String> {
    let rate = argument.trim_end_matches('x').parse::<f32>().ok();
    match rate.filter(|rate| PlaybackSpeed::STEPS.contains(rate)) {
        Some(rate) => Ok(PlaybackSpeed::nearest(rate)),
        None => Err(format!(
            "speed must be one of 0.5, 0.75, 1, 1.25, 1.5, 2 (got {argument:?})"
        )),
    }
}
