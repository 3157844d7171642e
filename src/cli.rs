use clap::Parser;
use std::path::PathBuf;

use crate::model::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER, FolderId};
use crate::player::{DEFAULT_PLAYER_COMMAND, PlayerVariant};

#[derive(Parser, Debug)]
#[command(name = "reelshelf")]
#[command(author, version, about = "Terminal browser and player for a remote video library")]
pub struct Cli {
    /// Base URL of the library server
    #[arg(short, long, env = "REELSHELF_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Video player executable
    #[arg(short, long, env = "REELSHELF_PLAYER", default_value = DEFAULT_PLAYER_COMMAND)]
    pub player: String,

    /// Player flavour: `subtitled` adds a subtitle selector
    #[arg(long, env = "REELSHELF_VARIANT", value_enum, default_value_t = PlayerVariant::Plain)]
    pub variant: PlayerVariant,

    /// Start browsing in this folder instead of the root
    #[arg(short, long)]
    pub folder: Option<FolderId>,

    /// Directory for log files
    #[arg(long, default_value = ".logs")]
    pub log_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,
}
