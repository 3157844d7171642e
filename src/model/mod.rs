//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (listings, capabilities, UI state, etc.)
//! - `library_client`: JSON-RPC client for the media library server
//! - `cache`: Per-session folder listing cache
//! - `context`: Folder context and navigation actions
//! - `playback`: Playback parameters, control values and URL building
//! - `session`: Playback session state machine
//! - `content`: View state for the browse list and player panel
//! - `app_model`: Main application model with state management methods

mod types;
mod library_client;
mod cache;
mod context;
mod playback;
mod session;
mod content;
mod app_model;

// Re-export all public types for convenient access
pub use types::{
    BrowseEntry, FolderId, FolderLink, FolderListing, ListingItem, MediaCapabilities, MediaId,
    PlayerControl, SubtitleTrack, UiState, ViewTag,
};

pub use library_client::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER, LibraryService, RpcLibraryClient,
};

pub use cache::FolderCache;

pub use context::{FolderContext, NavigationAction};

pub use playback::{
    ControlAvailability, ControlValues, ORIGINAL_RESOLUTION, PlaybackParameters, ServerPath,
};

pub use session::{PlaybackSession, SessionEvent, SessionPhase};

pub use content::{BrowseState, PlayerViewState};

pub use app_model::AppModel;
