//! Playback session: capability fetch, parameter state and the single live player

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::player::{PlayerBackend, PlayerInstance, PlayerSource, PlayerVariant};
use super::context::{FolderContext, NavigationAction};
use super::library_client::LibraryService;
use super::playback::{ControlValues, PlaybackParameters};
use super::types::{MediaCapabilities, MediaId};

/// Observable phase of a [`PlaybackSession`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    FetchingCapabilities,
    Ready,
    Disposed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::FetchingCapabilities => "fetching capabilities",
            SessionPhase::Ready => "ready",
            SessionPhase::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Inputs to the session state machine
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Start,
    /// Every control's current value; the player is rebuilt from them
    Reload(ControlValues),
    Dispose,
}

struct Ready {
    capabilities: Arc<MediaCapabilities>,
    parameters: PlaybackParameters,
    controls: ControlValues,
    source: PlayerSource,
    player: Box<dyn PlayerInstance>,
}

enum State {
    Uninitialized,
    FetchingCapabilities,
    Ready(Ready),
    Disposed,
}

/// Playback configuration for one media item
pub struct PlaybackSession {
    media_id: MediaId,
    context: FolderContext,
    variant: PlayerVariant,
    library: Arc<dyn LibraryService>,
    backend: Arc<dyn PlayerBackend>,
    cancel: CancellationToken,
    state: State,
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("media_id", &self.media_id)
            .field("folder_id", &self.context.folder_id)
            .field("variant", &self.variant)
            .field("phase", &self.phase())
            .finish()
    }
}

impl PlaybackSession {
    pub fn new(
        context: FolderContext,
        media_id: MediaId,
        variant: PlayerVariant,
        library: Arc<dyn LibraryService>,
        backend: Arc<dyn PlayerBackend>,
    ) -> Self {
        Self {
            media_id,
            context,
            variant,
            library,
            backend,
            cancel: CancellationToken::new(),
            state: State::Uninitialized,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        phase_of(&self.state)
    }

    pub fn media_id(&self) -> MediaId {
        self.media_id
    }

    pub fn context(&self) -> &FolderContext {
        &self.context
    }

    pub fn variant(&self) -> PlayerVariant {
        self.variant
    }

    /// Token that aborts a pending start when cancelled. Usable without
    /// holding the session, e.g. while `start` is awaiting the server.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn ready(&self) -> Option<&Ready> {
        match &self.state {
            State::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn capabilities(&self) -> Option<Arc<MediaCapabilities>> {
        self.ready().map(|r| r.capabilities.clone())
    }

    pub fn parameters(&self) -> Option<&PlaybackParameters> {
        self.ready().map(|r| &r.parameters)
    }

    pub fn controls(&self) -> Option<&ControlValues> {
        self.ready().map(|r| &r.controls)
    }

    pub fn source(&self) -> Option<&PlayerSource> {
        self.ready().map(|r| &r.source)
    }

    /// Action that returns to the folder this session was opened from
    pub fn back_to_folder(&self) -> NavigationAction {
        NavigationAction::browse(self.context.clone())
    }

    pub async fn start(&mut self) -> Result<()> {
        self.handle(SessionEvent::Start).await
    }

    pub async fn reload(&mut self, controls: ControlValues) -> Result<()> {
        self.handle(SessionEvent::Reload(controls)).await
    }

    pub async fn dispose(&mut self) -> Result<()> {
        self.handle(SessionEvent::Dispose).await
    }

    /// Apply one event. A transition that fails leaves the session disposed
    /// with no player running; an event that does not apply to the current
    /// phase is rejected and changes nothing.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<()> {
        let state = std::mem::replace(&mut self.state, State::Disposed);
        match (state, event) {
            (State::Uninitialized, SessionEvent::Start) => self.run_start().await,
            (State::Ready(ready), SessionEvent::Reload(controls)) => self.run_reload(ready, controls).await,
            (state, SessionEvent::Dispose) => {
                self.cancel.cancel();
                if let State::Ready(ready) = state {
                    tracing::info!(media_id = self.media_id, "Disposing playback session");
                    ready.player.destroy().await?;
                }
                Ok(())
            }
            (state, event) => {
                let phase = phase_of(&state);
                tracing::warn!(media_id = self.media_id, %phase, ?event, "Ignoring event for session state");
                self.state = state;
                match phase {
                    SessionPhase::Disposed => Err(SessionError::Disposed.into()),
                    _ => Err(SessionError::NotReady(phase).into()),
                }
            }
        }
    }

    async fn run_start(&mut self) -> Result<()> {
        self.state = State::FetchingCapabilities;
        tracing::debug!(media_id = self.media_id, "Fetching media capabilities");

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.library.media_info(self.media_id) => Some(result),
        };

        let capabilities = match fetched {
            None => {
                tracing::info!(media_id = self.media_id, "Session disposed while fetching capabilities");
                self.state = State::Disposed;
                return Err(SessionError::Disposed.into());
            }
            Some(Err(e)) => {
                self.state = State::Disposed;
                return Err(e.into());
            }
            Some(Ok(caps)) => Arc::new(caps),
        };

        let (parameters, controls) = PlaybackParameters::derive(&capabilities, self.variant);
        tracing::info!(
            media_id = self.media_id,
            bitrate = parameters.bitrate,
            resolution = %parameters.resolution,
            language = %parameters.language,
            "Derived default playback parameters"
        );

        let source = PlayerSource::build(self.variant, self.media_id, &parameters, &capabilities);
        let player = match self.backend.attach(&source).await {
            Ok(player) => player,
            Err(e) => {
                self.state = State::Disposed;
                return Err(e);
            }
        };

        self.state = State::Ready(Ready {
            capabilities,
            parameters,
            controls,
            source,
            player,
        });
        Ok(())
    }

    async fn run_reload(&mut self, ready: Ready, controls: ControlValues) -> Result<()> {
        let Ready {
            capabilities,
            player,
            ..
        } = ready;

        let parameters = PlaybackParameters::from_controls(&controls, &capabilities);
        let source = PlayerSource::build(self.variant, self.media_id, &parameters, &capabilities);
        tracing::debug!(media_id = self.media_id, url = %source.url, raw = parameters.raw, "Reloading player");

        // The old instance is gone before the next one exists
        player.destroy().await?;
        let player = self.backend.attach(&source).await?;

        self.state = State::Ready(Ready {
            capabilities,
            parameters,
            controls,
            source,
            player,
        });
        Ok(())
    }
}

fn phase_of(state: &State) -> SessionPhase {
    match state {
        State::Uninitialized => SessionPhase::Uninitialized,
        State::FetchingCapabilities => SessionPhase::FetchingCapabilities,
        State::Ready(_) => SessionPhase::Ready,
        State::Disposed => SessionPhase::Disposed,
    }
}
