//! Playback parameters, the control surface, and stream/subtitle URL building

use std::fmt;

use anyhow::Result;
use reqwest::Url;

use crate::player::PlayerVariant;
use super::types::{MediaCapabilities, MediaId, PlayerControl};

/// Bitrate picked when the item offers it (and the fallback for an empty list)
pub const PREFERRED_BITRATE: u32 = 500;
pub const PREFERRED_RESOLUTION: &str = "360p";
/// Logical resolution meaning "no downscale"
pub const ORIGINAL_RESOLUTION: &str = "orig";
/// Language value meaning "server's default audio track"
pub const DEFAULT_LANGUAGE: &str = "0";

/// Values currently shown by the player view's controls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlValues {
    pub bitrate: u32,
    pub resolution: String,
    pub language: String,
    /// `None` when the player variant has no subtitle selector
    pub subtitle: Option<String>,
    pub raw: bool,
}

/// Which controls accept input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlAvailability {
    pub bitrate: bool,
    pub resolution: bool,
    pub language: bool,
}

impl ControlAvailability {
    /// Raw delivery bypasses bitrate, resolution and language.
    pub fn from_raw(raw: bool) -> Self {
        Self {
            bitrate: !raw,
            resolution: !raw,
            language: !raw,
        }
    }

    pub fn allows(&self, control: PlayerControl) -> bool {
        match control {
            PlayerControl::Bitrate => self.bitrate,
            PlayerControl::Resolution => self.resolution,
            PlayerControl::Language => self.language,
            PlayerControl::Subtitle | PlayerControl::Raw => true,
        }
    }
}

/// Parameters the stream is requested with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackParameters {
    pub bitrate: u32,
    pub resolution: String,
    pub language: String,
    pub subtitle: String,
    pub raw: bool,
}

impl PlaybackParameters {
    /// Initial parameters for `caps`, with the values the controls should show.
    pub fn derive(caps: &MediaCapabilities, variant: PlayerVariant) -> (Self, ControlValues) {
        let bitrate = if caps.bitrates.contains(&PREFERRED_BITRATE) {
            PREFERRED_BITRATE
        } else {
            caps.bitrates.first().copied().unwrap_or(PREFERRED_BITRATE)
        };

        let (resolution, shown_resolution) =
            if caps.resolutions.iter().any(|r| r == PREFERRED_RESOLUTION) {
                (PREFERRED_RESOLUTION.to_string(), PREFERRED_RESOLUTION.to_string())
            } else {
                let shown = caps
                    .resolutions
                    .first()
                    .cloned()
                    .unwrap_or_else(|| ORIGINAL_RESOLUTION.to_string());
                (ORIGINAL_RESOLUTION.to_string(), shown)
            };

        let language = caps
            .audio_languages
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let subtitle = if variant.has_subtitle_control() {
            caps.subtitles.first().map(|s| s.label.clone()).unwrap_or_default()
        } else {
            String::new()
        };

        let controls = ControlValues {
            bitrate,
            resolution: shown_resolution,
            language: language.clone(),
            subtitle: variant.has_subtitle_control().then(|| subtitle.clone()),
            raw: false,
        };

        let params = Self {
            bitrate,
            resolution,
            language,
            subtitle,
            raw: false,
        };

        (params, controls)
    }

    /// Parameters read back from every control. The first resolution entry is
    /// the "original" position and maps to the `orig` sentinel.
    pub fn from_controls(controls: &ControlValues, caps: &MediaCapabilities) -> Self {
        let resolution = match caps.resolutions.first() {
            Some(first) if *first == controls.resolution => ORIGINAL_RESOLUTION.to_string(),
            _ => controls.resolution.clone(),
        };

        Self {
            bitrate: controls.bitrate,
            resolution,
            language: controls.language.clone(),
            subtitle: controls.subtitle.clone().unwrap_or_default(),
            raw: controls.raw,
        }
    }

    pub fn stream_path(&self, media_id: MediaId) -> ServerPath {
        ServerPath {
            path: format!("/stream/{}.{}", media_id, if self.raw { "mp4" } else { "m3u8" }),
            query: vec![
                ("br", self.bitrate.to_string()),
                ("res", self.resolution.clone()),
                ("lang", first_colon_segment(&self.language).to_string()),
            ],
        }
    }

    pub fn subtitle_path(&self, media_id: MediaId) -> ServerPath {
        ServerPath {
            path: format!("/sub/{}.srt", media_id),
            query: vec![("sub", self.subtitle.clone())],
        }
    }

    pub fn stream_url(&self, media_id: MediaId) -> String {
        self.stream_path(media_id).to_string()
    }

    pub fn subtitle_url(&self, media_id: MediaId) -> String {
        self.subtitle_path(media_id).to_string()
    }
}

/// A server endpoint with its query values kept raw until resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerPath {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl ServerPath {
    /// Absolute URL under `base`, with every query value percent-encoded.
    /// `base` should end in `/` for a path prefix to be kept.
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let mut url = base.join(self.path.trim_start_matches('/'))?;
        url.set_query(None);
        url.set_fragment(None);
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// Unencoded form, for display and logs
impl fmt::Display for ServerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            write!(f, "{}{}={}", if i == 0 { '?' } else { '&' }, key, value)?;
        }
        Ok(())
    }
}

/// Language tags may carry a `:codec` style suffix the stream endpoint does not take
pub fn first_colon_segment(language: &str) -> &str {
    language.split(':').next().unwrap_or(language)
}

impl ControlValues {
    pub fn availability(&self) -> ControlAvailability {
        ControlAvailability::from_raw(self.raw)
    }

    /// Display value of one control
    pub fn display(&self, control: PlayerControl) -> String {
        match control {
            PlayerControl::Bitrate => format!("{} kb/s", self.bitrate),
            PlayerControl::Resolution => self.resolution.clone(),
            PlayerControl::Language => self.language.clone(),
            PlayerControl::Subtitle => match self.subtitle.as_deref() {
                Some("") | None => "Off".to_string(),
                Some(label) => label.to_string(),
            },
            PlayerControl::Raw => (if self.raw { "[x]" } else { "[ ]" }).to_string(),
        }
    }

    /// Move `control` to the next (or previous) option offered by `caps`.
    /// Returns false when nothing changed.
    pub fn step(&mut self, control: PlayerControl, caps: &MediaCapabilities, forward: bool) -> bool {
        if !self.availability().allows(control) {
            return false;
        }
        match control {
            PlayerControl::Bitrate => {
                let options: Vec<String> = caps.bitrates.iter().map(|b| b.to_string()).collect();
                match step_option(&options, &self.bitrate.to_string(), forward) {
                    Some(next) => {
                        self.bitrate = next.parse().unwrap_or(self.bitrate);
                        true
                    }
                    None => false,
                }
            }
            PlayerControl::Resolution => {
                step_in_place(&mut self.resolution, &caps.resolutions, forward)
            }
            PlayerControl::Language => {
                step_in_place(&mut self.language, &caps.audio_languages, forward)
            }
            PlayerControl::Subtitle => {
                let Some(current) = self.subtitle.as_mut() else {
                    return false;
                };
                let mut options: Vec<String> = caps.subtitles.iter().map(|s| s.label.clone()).collect();
                if options.is_empty() {
                    return false;
                }
                options.push(String::new());
                step_in_place(current, &options, forward)
            }
            PlayerControl::Raw => {
                self.raw = !self.raw;
                true
            }
        }
    }
}

fn step_in_place(value: &mut String, options: &[String], forward: bool) -> bool {
    match step_option(options, value, forward) {
        Some(next) => {
            *value = next;
            true
        }
        None => false,
    }
}

fn step_option(options: &[String], current: &str, forward: bool) -> Option<String> {
    if options.len() < 2 && options.first().is_some_and(|o| o == current) {
        return None;
    }
    let next = match options.iter().position(|o| o == current) {
        Some(i) if forward => (i + 1) % options.len(),
        Some(i) => (i + options.len() - 1) % options.len(),
        None => 0,
    };
    options.get(next).cloned()
}
