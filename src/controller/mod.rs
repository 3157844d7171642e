//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives playback sessions.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Navigation actions between the browse and player views
//! - `playback`: Player control edits and reloads

mod input;
mod navigation;
mod playback;

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{LibraryError, SessionError};
use crate::model::{AppModel, LibraryService, PlaybackSession};
use crate::player::{PlayerBackend, PlayerVariant};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    library: Arc<dyn LibraryService>,
    backend: Arc<dyn PlayerBackend>,
    variant: PlayerVariant,
    /// The ready session, if any
    session: Arc<Mutex<Option<PlaybackSession>>>,
    /// Cancels the newest session, including one still starting
    session_cancel: Arc<Mutex<Option<CancellationToken>>>,
}

impl AppController {
    pub fn new(
        model: Arc<AppModel>,
        library: Arc<dyn LibraryService>,
        backend: Arc<dyn PlayerBackend>,
        variant: PlayerVariant,
    ) -> Self {
        Self {
            model,
            library,
            backend,
            variant,
            session: Arc::new(Mutex::new(None)),
            session_cancel: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        if let Some(e) = error.downcast_ref::<LibraryError>() {
            return match e {
                LibraryError::Http(http) if http.is_timeout() => {
                    "Library server timed out. Try again.".to_string()
                }
                LibraryError::Http(http) if http.is_connect() => {
                    "Cannot reach the library server. Check --server.".to_string()
                }
                LibraryError::Http(http) => match http.status() {
                    Some(status) => format!("Library server answered {}", status),
                    None => format!("Error: {}", e),
                },
                LibraryError::Decode(_) => "Library server sent an unreadable reply.".to_string(),
                LibraryError::Rpc { message } => format!("Server error: {}", message),
            };
        }
        if let Some(SessionError::NotReady(_)) = error.downcast_ref::<SessionError>() {
            return "Player is still starting.".to_string();
        }

        let error_str = format!("{:#}", error);
        if error_str.contains("failed to start player") {
            "Could not start the video player. Check --player.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }

    /// Show `error` to the user and log it
    pub(crate) async fn report(&self, what: &str, error: &anyhow::Error) {
        tracing::error!(error = %format!("{:#}", error), "{} failed", what);
        self.model.set_error(Self::format_error(error)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rpc_errors() {
        let error = anyhow::Error::from(LibraryError::Rpc {
            message: "Record does not exist".to_string(),
        });
        assert_eq!(AppController::format_error(&error), "Server error: Record does not exist");
    }

    #[test]
    fn formats_player_start_failure() {
        let error = anyhow::anyhow!("No such file or directory").context("failed to start player `mpv`");
        assert_eq!(
            AppController::format_error(&error),
            "Could not start the video player. Check --player."
        );
    }
}
