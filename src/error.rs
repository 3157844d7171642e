//! Error types for the library service boundary and the playback session

use thiserror::Error;

use crate::model::SessionPhase;

/// Errors returned by a [`LibraryService`](crate::model::LibraryService) call
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Transport failure talking to the library server
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payload could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered with an RPC error object
    #[error("library server error: {message}")]
    Rpc { message: String },
}

/// Transitions that are not valid for the session's current state
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("playback session was disposed")]
    Disposed,

    #[error("playback session is not ready (currently {0})")]
    NotReady(SessionPhase),
}
