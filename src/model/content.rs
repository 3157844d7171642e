//! View state for the browse list and the player panel

use std::sync::Arc;

use crate::player::{PlayerSource, PlayerVariant};
use super::context::FolderContext;
use super::playback::{ControlValues, PlaybackParameters};
use super::session::{PlaybackSession, SessionPhase};
use super::types::{BrowseEntry, FolderListing, MediaCapabilities, MediaId, PlayerControl};

/// Browse view: the folder being shown and the selection within it
#[derive(Clone, Debug, Default)]
pub struct BrowseState {
    pub context: FolderContext,
    pub listing: Option<Arc<FolderListing>>,
    pub entries: Vec<BrowseEntry>,
    pub selected_index: usize,
    pub is_loading: bool,
}

impl BrowseState {
    pub fn selected_entry(&self) -> Option<&BrowseEntry> {
        self.entries.get(self.selected_index)
    }

    pub fn path(&self) -> &str {
        self.listing.as_deref().map(FolderListing::path).unwrap_or("")
    }
}

/// Player view: a render-ready copy of the session plus control focus
#[derive(Clone, Debug)]
pub struct PlayerViewState {
    pub media_id: Option<MediaId>,
    pub phase: SessionPhase,
    pub variant: PlayerVariant,
    pub capabilities: Option<Arc<MediaCapabilities>>,
    pub controls: Option<ControlValues>,
    pub parameters: Option<PlaybackParameters>,
    pub source: Option<PlayerSource>,
    pub focused: PlayerControl,
}

impl Default for PlayerViewState {
    fn default() -> Self {
        Self {
            media_id: None,
            phase: SessionPhase::Uninitialized,
            variant: PlayerVariant::Plain,
            capabilities: None,
            controls: None,
            parameters: None,
            source: None,
            focused: PlayerControl::Bitrate,
        }
    }
}

impl PlayerViewState {
    /// Copy what the view shows out of `session`, keeping the control focus
    pub fn refresh_from(&mut self, session: &PlaybackSession) {
        if self.media_id != Some(session.media_id()) {
            self.focused = PlayerControl::Bitrate;
        }
        self.media_id = Some(session.media_id());
        self.phase = session.phase();
        self.variant = session.variant();
        self.capabilities = session.capabilities();
        self.controls = session.controls().cloned();
        self.parameters = session.parameters().cloned();
        self.source = session.source().cloned();
    }

    pub fn title(&self) -> &str {
        self.capabilities.as_deref().map(|c| c.name.as_str()).unwrap_or("")
    }

    /// Controls shown for this variant, in focus order
    pub fn visible_controls(&self) -> Vec<PlayerControl> {
        let mut controls = vec![
            PlayerControl::Bitrate,
            PlayerControl::Resolution,
            PlayerControl::Language,
        ];
        if self.variant.has_subtitle_control() {
            controls.push(PlayerControl::Subtitle);
        }
        controls.push(PlayerControl::Raw);
        controls
    }
}
