//! Folder context and the navigation actions that carry it between views

use super::cache::FolderCache;
use super::types::{BrowseEntry, FolderId, MediaId, ViewTag};

/// Where the user is browsing, plus the cache of everything fetched so far
#[derive(Clone, Debug, Default)]
pub struct FolderContext {
    pub folder_id: Option<FolderId>,
    pub cache: FolderCache,
}

impl FolderContext {
    /// Fresh cache, starting in `folder_id`
    pub fn at(folder_id: Option<FolderId>) -> Self {
        Self {
            folder_id,
            cache: FolderCache::new(),
        }
    }

    /// Same cache, different folder
    pub fn with_folder(&self, folder_id: Option<FolderId>) -> Self {
        Self {
            folder_id,
            cache: self.cache.clone(),
        }
    }
}

/// Request to switch the top-level view
#[derive(Clone, Debug)]
pub struct NavigationAction {
    pub view: ViewTag,
    pub context: FolderContext,
    pub media_id: Option<MediaId>,
}

impl NavigationAction {
    pub fn browse(context: FolderContext) -> Self {
        Self {
            view: ViewTag::Browse,
            context,
            media_id: None,
        }
    }

    pub fn media_player(context: FolderContext, media_id: MediaId) -> Self {
        Self {
            view: ViewTag::MediaPlayer,
            context,
            media_id: Some(media_id),
        }
    }

    /// Action for activating `entry` while browsing `context`
    pub fn for_entry(context: &FolderContext, entry: &BrowseEntry) -> Self {
        match entry {
            BrowseEntry::Parent { id, .. } => Self::browse(context.with_folder(*id)),
            BrowseEntry::Folder { id, .. } => Self::browse(context.with_folder(Some(*id))),
            BrowseEntry::Media { id, .. } => Self::media_player(context.clone(), *id),
        }
    }
}
