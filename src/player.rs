//! Video player adapter: source descriptors and the external player process

use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::Url;
use tokio::process::{Child, Command};

use crate::model::{MediaCapabilities, MediaId, PlaybackParameters, ServerPath, SubtitleTrack};

pub const DEFAULT_PLAYER_COMMAND: &str = "mpv";

/// Which flavour of player the session drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PlayerVariant {
    /// Bitrate/resolution/language controls; the server's subtitle files are
    /// handed to the player as external tracks
    #[default]
    Plain,
    /// Adds a subtitle selector and loads the chosen track through the
    /// subtitle endpoint
    Subtitled,
}

impl PlayerVariant {
    pub fn has_subtitle_control(self) -> bool {
        matches!(self, PlayerVariant::Subtitled)
    }
}

/// Everything a player needs to start one stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSource {
    pub stream: ServerPath,
    /// Selected track through the subtitle endpoint
    pub subtitle: Option<ServerPath>,
    /// Server-relative stream path, unencoded
    pub url: String,
    pub subtitle_url: Option<String>,
    pub external_tracks: Vec<SubtitleTrack>,
    pub chromeless: bool,
    pub autoplay: bool,
}

impl PlayerSource {
    pub fn build(
        variant: PlayerVariant,
        media_id: MediaId,
        params: &PlaybackParameters,
        caps: &MediaCapabilities,
    ) -> Self {
        let stream = params.stream_path(media_id);
        let url = stream.to_string();
        match variant {
            PlayerVariant::Plain => Self {
                stream,
                subtitle: None,
                url,
                subtitle_url: None,
                external_tracks: caps.subtitles.clone(),
                chromeless: !caps.subtitles.is_empty(),
                autoplay: true,
            },
            PlayerVariant::Subtitled => {
                let subtitle = (!params.subtitle.is_empty()).then(|| params.subtitle_path(media_id));
                Self {
                    stream,
                    subtitle_url: subtitle.as_ref().map(ServerPath::to_string),
                    subtitle,
                    url,
                    external_tracks: Vec::new(),
                    chromeless: false,
                    autoplay: true,
                }
            }
        }
    }

    /// Subtitle paths to load: the selected track or every external track
    pub fn subtitle_paths(&self) -> Vec<&str> {
        match &self.subtitle_url {
            Some(url) => vec![url.as_str()],
            None => self.external_tracks.iter().map(|t| t.src.as_str()).collect(),
        }
    }
}

/// Something that can start playing a [`PlayerSource`]
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    async fn attach(&self, source: &PlayerSource) -> Result<Box<dyn PlayerInstance>>;
}

/// A running player. It cannot switch sources; a new source means a new instance.
#[async_trait]
pub trait PlayerInstance: Send + Sync {
    /// Stop playback and release everything the instance holds
    async fn destroy(self: Box<Self>) -> Result<()>;
}

/// Plays streams in an external player process (mpv by default)
#[derive(Clone, Debug)]
pub struct ProcessPlayerBackend {
    command: String,
    /// Server root, always ending in `/`
    base: Url,
}

impl ProcessPlayerBackend {
    pub fn new(command: &str, base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).with_context(|| format!("invalid server url `{}`", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid server url `{}`", base_url);
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            command: command.to_string(),
            base,
        })
    }

    /// Server-provided track sources are resolved the way a browser resolves a link
    fn track_url(&self, src: &str) -> Result<Url> {
        self.base
            .join(src.trim_start_matches('/'))
            .with_context(|| format!("invalid subtitle source `{}`", src))
    }

    /// Command line arguments for `source`
    pub fn args(&self, source: &PlayerSource) -> Result<Vec<String>> {
        let mut args = vec!["--force-window=yes".to_string()];
        if !source.autoplay {
            args.push("--pause".to_string());
        }
        if source.chromeless {
            args.push("--osc=no".to_string());
        }
        match &source.subtitle {
            Some(subtitle) => args.push(format!("--sub-file={}", subtitle.resolve(&self.base)?)),
            None => {
                for track in &source.external_tracks {
                    args.push(format!("--sub-file={}", self.track_url(&track.src)?));
                }
            }
        }
        args.push(source.stream.resolve(&self.base)?.to_string());
        Ok(args)
    }
}

#[async_trait]
impl PlayerBackend for ProcessPlayerBackend {
    async fn attach(&self, source: &PlayerSource) -> Result<Box<dyn PlayerInstance>> {
        let args = self.args(source)?;
        tracing::info!(command = %self.command, url = %source.url, "Starting player");

        let child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start player `{}`", self.command))?;

        tracing::debug!(pid = ?child.id(), "Player process started");
        Ok(Box::new(ProcessPlayer { child }))
    }
}

struct ProcessPlayer {
    child: Child,
}

#[async_trait]
impl PlayerInstance for ProcessPlayer {
    async fn destroy(self: Box<Self>) -> Result<()> {
        let mut child = self.child;
        let pid = child.id();
        // Already exited (user closed the window): just reap it
        if child.try_wait()?.is_none() {
            child.kill().await.context("failed to stop player")?;
        } else {
            child.wait().await?;
        }
        tracing::debug!(pid = ?pid, "Player process stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(subtitle: &str) -> PlaybackParameters {
        PlaybackParameters {
            bitrate: 500,
            resolution: "orig".to_string(),
            language: "en:ac3".to_string(),
            subtitle: subtitle.to_string(),
            raw: false,
        }
    }

    fn caps_with_subtitles() -> MediaCapabilities {
        MediaCapabilities {
            subtitles: vec![SubtitleTrack {
                srclang: "en".to_string(),
                kind: "subtitles".to_string(),
                label: "heat.srt".to_string(),
                src: "/sub/42.srt?sub=heat.srt".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn plain_variant_passes_external_tracks() {
        let source = PlayerSource::build(PlayerVariant::Plain, 42, &params(""), &caps_with_subtitles());
        assert_eq!(source.url, "/stream/42.m3u8?br=500&res=orig&lang=en");
        assert_eq!(source.subtitle_url, None);
        assert!(source.chromeless);
        assert_eq!(source.subtitle_paths(), vec!["/sub/42.srt?sub=heat.srt"]);
    }

    #[test]
    fn subtitled_variant_uses_selected_track() {
        let caps = caps_with_subtitles();
        let source = PlayerSource::build(PlayerVariant::Subtitled, 42, &params("heat.srt"), &caps);
        assert_eq!(source.subtitle_url.as_deref(), Some("/sub/42.srt?sub=heat.srt"));
        assert!(source.external_tracks.is_empty());

        let off = PlayerSource::build(PlayerVariant::Subtitled, 42, &params(""), &caps);
        assert_eq!(off.subtitle_url, None);
        assert!(off.subtitle_paths().is_empty());
    }

    #[test]
    fn process_args_resolve_against_server() {
        let backend = ProcessPlayerBackend::new("mpv", "http://media.local:8069/").unwrap();
        let source = PlayerSource::build(PlayerVariant::Subtitled, 42, &params("fr"), &MediaCapabilities::default());
        assert_eq!(
            backend.args(&source).unwrap(),
            vec![
                "--force-window=yes".to_string(),
                "--sub-file=http://media.local:8069/sub/42.srt?sub=fr".to_string(),
                "http://media.local:8069/stream/42.m3u8?br=500&res=orig&lang=en".to_string(),
            ]
        );
    }

    #[test]
    fn subtitle_label_stays_one_query_value() {
        let label = "Heat (1995) & extras #1.en.srt";
        let backend = ProcessPlayerBackend::new("mpv", "http://media.local:8069").unwrap();
        let source = PlayerSource::build(PlayerVariant::Subtitled, 42, &params(label), &MediaCapabilities::default());
        assert_eq!(source.subtitle_url.as_deref(), Some("/sub/42.srt?sub=Heat (1995) & extras #1.en.srt"));

        let args = backend.args(&source).unwrap();
        let sub = args.iter().find_map(|a| a.strip_prefix("--sub-file=")).unwrap();
        let url = Url::parse(sub).unwrap();
        assert_eq!(url.path(), "/sub/42.srt");
        assert_eq!(url.fragment(), None);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("sub".to_string(), label.to_string())]);
    }

    #[test]
    fn external_tracks_keep_server_prefix() {
        let backend = ProcessPlayerBackend::new("mpv", "http://media.local/odoo").unwrap();
        let mut caps = caps_with_subtitles();
        caps.subtitles[0].src = "/sub/42.srt?sub=heat%20en.srt".to_string();
        let source = PlayerSource::build(PlayerVariant::Plain, 42, &params(""), &caps);

        let args = backend.args(&source).unwrap();
        assert_eq!(
            args[2..],
            [
                "--sub-file=http://media.local/odoo/sub/42.srt?sub=heat%20en.srt".to_string(),
                "http://media.local/odoo/stream/42.m3u8?br=500&res=orig&lang=en".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_unparseable_server() {
        assert!(ProcessPlayerBackend::new("mpv", "media.local").is_err());
        assert!(ProcessPlayerBackend::new("mpv", "mailto:media@local").is_err());
    }

    #[tokio::test]
    async fn missing_player_binary_fails_to_attach() {
        let backend = ProcessPlayerBackend::new("reelshelf-no-such-player", "http://127.0.0.1").unwrap();
        let source = PlayerSource::build(PlayerVariant::Plain, 1, &params(""), &MediaCapabilities::default());
        assert!(backend.attach(&source).await.is_err());
    }
}
