//! Core type definitions for the application

use std::time::Instant;

use serde::{Deserialize, Deserializer, Serialize};

pub type FolderId = i64;
pub type MediaId = i64;

/// Which top-level view is shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTag {
    #[default]
    Browse,
    MediaPlayer,
}

/// Link to another folder. The server encodes "no record" as `false`, which
/// for a parent link means the root listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderLink {
    #[serde(deserialize_with = "id_or_false")]
    pub id: Option<FolderId>,
    #[serde(default)]
    pub name: String,
}

/// A sub-folder or a media item in a listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub id: i64,
    pub name: String,
}

/// Contents of one library folder, as reported by the server
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(rename = "parent_id", default)]
    pub parent: Option<FolderLink>,
    #[serde(rename = "current_id", default)]
    pub current: Option<FolderLink>,
    #[serde(rename = "child_ids", default)]
    pub folders: Vec<ListingItem>,
    #[serde(rename = "media_ids", default)]
    pub media: Vec<ListingItem>,
}

/// One selectable row of the browse view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowseEntry {
    Parent { id: Option<FolderId>, name: String },
    Folder { id: FolderId, name: String },
    Media { id: MediaId, name: String },
}

impl BrowseEntry {
    pub fn label(&self) -> String {
        match self {
            BrowseEntry::Parent { .. } => "..".to_string(),
            BrowseEntry::Folder { name, .. } => format!("{}/", name),
            BrowseEntry::Media { name, .. } => name.clone(),
        }
    }
}

impl FolderListing {
    /// Parent link first, then sub-folders, then media, in server order.
    pub fn entries(&self) -> Vec<BrowseEntry> {
        let mut entries = Vec::with_capacity(self.folders.len() + self.media.len() + 1);
        if let Some(parent) = &self.parent {
            entries.push(BrowseEntry::Parent {
                id: parent.id,
                name: parent.name.clone(),
            });
        }
        entries.extend(self.folders.iter().map(|f| BrowseEntry::Folder {
            id: f.id,
            name: f.name.clone(),
        }));
        entries.extend(self.media.iter().map(|m| BrowseEntry::Media {
            id: m.id,
            name: m.name.clone(),
        }));
        entries
    }

    /// Display path of the folder, empty for the root listing
    pub fn path(&self) -> &str {
        self.current.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }
}

/// External subtitle file offered for a media item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    #[serde(default)]
    pub srclang: String,
    #[serde(default)]
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub src: String,
}

/// Selectable playback dimensions of one media item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCapabilities {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(rename = "br_list", default)]
    pub bitrates: Vec<u32>,
    /// First entry is the server's "original" label
    #[serde(rename = "res_list", default)]
    pub resolutions: Vec<String>,
    #[serde(rename = "audio_tracks_lang", default, deserialize_with = "null_as_empty")]
    pub audio_languages: Vec<String>,
    #[serde(rename = "sub_list", default)]
    pub subtitles: Vec<SubtitleTrack>,
}

fn id_or_false<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdOrFlag {
        Id(i64),
        Flag(bool),
    }

    match Option::<IdOrFlag>::deserialize(deserializer)? {
        Some(IdOrFlag::Id(id)) => Ok(Some(id)),
        Some(IdOrFlag::Flag(true)) => Err(serde::de::Error::custom("expected a record id or false")),
        Some(IdOrFlag::Flag(false)) | None => Ok(None),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One of the player view's controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayerControl {
    #[default]
    Bitrate,
    Resolution,
    Language,
    Subtitle,
    Raw,
}

impl PlayerControl {
    pub fn next(self, with_subtitle: bool) -> Self {
        match self {
            Self::Bitrate => Self::Resolution,
            Self::Resolution => Self::Language,
            Self::Language if with_subtitle => Self::Subtitle,
            Self::Language | Self::Subtitle => Self::Raw,
            Self::Raw => Self::Bitrate,
        }
    }

    pub fn prev(self, with_subtitle: bool) -> Self {
        match self {
            Self::Bitrate => Self::Raw,
            Self::Resolution => Self::Bitrate,
            Self::Language => Self::Resolution,
            Self::Subtitle => Self::Language,
            Self::Raw if with_subtitle => Self::Subtitle,
            Self::Raw => Self::Language,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bitrate => "Bitrate",
            Self::Resolution => "Resolution",
            Self::Language => "Audio",
            Self::Subtitle => "Subtitle",
            Self::Raw => "Raw file",
        }
    }
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_view: ViewTag,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    pub server: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_view: ViewTag::Browse,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
            server: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_listing_with_root_parent() {
        let raw = r#"{
            "parent_id": {"id": false, "name": "/srv/videos"},
            "current_id": {"id": 7, "name": "/srv/videos/films"},
            "child_ids": [{"id": 8, "name": "noir"}],
            "media_ids": [{"id": 42, "name": "heat.mkv"}, {"id": 43, "name": "ronin.mkv"}]
        }"#;
        let listing: FolderListing = serde_json::from_str(raw).unwrap();

        assert_eq!(listing.parent.as_ref().unwrap().id, None);
        assert_eq!(listing.path(), "/srv/videos/films");
        assert_eq!(
            listing.entries(),
            vec![
                BrowseEntry::Parent { id: None, name: "/srv/videos".to_string() },
                BrowseEntry::Folder { id: 8, name: "noir".to_string() },
                BrowseEntry::Media { id: 42, name: "heat.mkv".to_string() },
                BrowseEntry::Media { id: 43, name: "ronin.mkv".to_string() },
            ]
        );
    }

    #[test]
    fn root_listing_has_no_parent_entry() {
        let listing: FolderListing =
            serde_json::from_str(r#"{"child_ids": [{"id": 1, "name": "/srv/videos"}], "media_ids": []}"#)
                .unwrap();
        assert_eq!(listing.path(), "");
        assert_eq!(listing.entries().len(), 1);
        assert_eq!(listing.entries()[0].label(), "/srv/videos/");
    }

    #[test]
    fn capabilities_accept_null_languages() {
        let caps: MediaCapabilities = serde_json::from_str(
            r#"{"name": "heat", "br_list": [4200, 500], "res_list": ["Original", "360p"],
                "audio_tracks_lang": null, "sub_list": []}"#,
        )
        .unwrap();
        assert!(caps.audio_languages.is_empty());
        assert_eq!(caps.bitrates, vec![4200, 500]);
    }

    #[test]
    fn control_focus_skips_subtitle_in_plain_variant() {
        assert_eq!(PlayerControl::Language.next(false), PlayerControl::Raw);
        assert_eq!(PlayerControl::Language.next(true), PlayerControl::Subtitle);
        assert_eq!(PlayerControl::Raw.prev(false), PlayerControl::Language);
        assert_eq!(PlayerControl::Raw.next(true), PlayerControl::Bitrate);
    }
}
