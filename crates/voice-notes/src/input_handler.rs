//! Line-oriented terminal input.
//!
//! Reads user commands, parses them into [`Intent`]s and forwards them to the
//! main application over the command channel. End of input is a shutdown
//! request.

use crate::{AppCommand, AppError, AppResult, Intent};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument};

/// Forwards parsed input lines to the application loop.
pub struct InputHandler<I> {
    input: I,
    command_tx: mpsc::Sender<AppCommand>,
}

impl<I: AsyncBufRead + Unpin> InputHandler<I> {
    /// Create a handler reading from `input`.
    pub fn new(input: I, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { input, command_tx }
    }

    /// Run until input ends, `quit` is forwarded, or shutdown is signalled.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let command_tx = self.command_tx;
        let mut lines = self.input.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Input handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        send(&command_tx, AppCommand::Shutdown).await?;
                        break;
                    };

                    let Some(command) = parse_line(&line) else {
                        continue;
                    };
                    let quit = command == AppCommand::Intent(Intent::Quit);
                    send(&command_tx, command).await?;
                    if quit {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Blank lines are ignored.
pub(crate) fn parse_line(line: &str) -> Option<AppCommand> {
    if line.trim().is_empty() {
        return None;
    }
    Some(match line.parse::<Intent>() {
        Ok(intent) => AppCommand::Intent(intent),
        Err(reason) => AppCommand::Rejected { reason },
    })
}

async fn send(command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) -> AppResult<()> {
    let caller = Location::caller();
    command_tx
        .send(command)
        .await
        .map_err(|e| AppError::ChannelSendFailed {
            message: format!("Failed to forward input: {}", e),
            location: ErrorLocation::from(caller),
        })
}
