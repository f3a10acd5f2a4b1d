//! Voice Notes: record, browse and replay short audio notes from the terminal.

mod app;
mod app_command;
mod config;
mod error;
mod input_handler;
mod intent;
mod note_list;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
    intent::Intent,
    note_list::NoteListView,
};

use crate::config::{Config, LoggingConfig};

use voice_notes_core::{CpalPlaybackBackend, CpalRecordingBackend, NoteStore, SessionCoordinator};

use std::time::Duration;

use tokio::{
    io::BufReader,
    sync::{mpsc, watch},
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Finalized captures are written here before being moved next to the notes,
/// so the move stays on one filesystem.
const CAPTURE_DIR: &str = "capture";

/// Application entry point.
fn main() {
    let config = Config::load();

    let fallback = LoggingConfig::default();
    init_tracing(config.as_ref().map_or(&fallback, |c| &c.logging));

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config));

    // Stdin is read on a blocking thread that cannot be interrupted.
    rt.shutdown_timeout(Duration::from_secs(1));

    if let Err(e) = result {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr so they do
/// not interleave with the note list on stdout.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(config: Config) -> AppResult<()> {
    let data_dir = config.data_dir()?;

    let recording =
        CpalRecordingBackend::new(config.audio.input_device.clone(), data_dir.join(CAPTURE_DIR));
    let playback = CpalPlaybackBackend::new(config.audio.output_device.clone());
    let mut coordinator = SessionCoordinator::new(recording, playback, NoteStore::new(&data_dir));
    coordinator.load().await?;

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let input_handler = InputHandler::new(BufReader::new(tokio::io::stdin()), command_tx.clone());

    let app = App {
        coordinator,
        view: NoteListView::default(),
        out: std::io::stdout(),
        command_tx,
        command_rx,
        shutdown_tx,
    };

    let (input_result, app_result) = tokio::join!(input_handler.run(shutdown_rx), app.run());
    if let Err(e) = input_result {
        error!(error = ?e, "Input handler error");
    }
    app_result
}
