use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Parser, ValueEnum};
use clipfetch_core::{Platform, DEFAULT_QUALITY, QUALITY_PRESETS};

/// Download media through a clipfetch server.
///
/// With a URL, runs one job and exits. Without one, reads commands from
/// stdin: a URL starts a job, `platform <name>` and `quality <preset>` change
/// the form, `cancel` cancels the running job and `quit` exits.
#[derive(Debug, Parser)]
#[command(name = "clipfetch", version)]
pub struct Cli {
    /// Media URL to download.
    pub url: Option<String>,

    #[arg(short, long, value_enum, default_value_t = PlatformArg::Youtube)]
    pub platform: PlatformArg,

    /// Quality preset; only YouTube honours it.
    #[arg(
        short,
        long,
        default_value = DEFAULT_QUALITY,
        value_parser = PossibleValuesParser::new(QUALITY_PRESETS.iter().copied())
    )]
    pub quality: String,

    /// File whose contents are sent as the cookies string.
    #[arg(long, value_name = "PATH")]
    pub cookies_file: Option<PathBuf>,

    /// Server base URL; overrides CLIPFETCH_SERVER_URL.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Download directory; overrides CLIPFETCH_DOWNLOAD_DIR.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also write ./clipfetch.log.
    #[arg(long)]
    pub log_file: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Youtube,
    Instagram,
    Spotify,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Youtube => Platform::Youtube,
            PlatformArg::Instagram => Platform::Instagram,
            PlatformArg::Spotify => Platform::Spotify,
        }
    }
}
