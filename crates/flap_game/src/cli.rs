use std::path::PathBuf;

use clap::Parser;
use flap_core::assets::DEFAULT_ASSET_DIR;

#[derive(Debug, Parser)]
#[command(
    name = "flap_game",
    version,
    about = "Side-scrolling flapper, played with the keyboard or a serial board button"
)]
pub struct Args {
    /// Game config JSON (defaults to assets/config/game.json when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the five sprite PNGs
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ASSET_DIR)]
    pub assets: PathBuf,

    /// Serial port of the board, e.g. COM5, 5 or /dev/ttyACM0
    #[arg(long, value_name = "PORT", conflicts_with = "no_device")]
    pub device: Option<String>,

    /// Play with the keyboard only, even if the config names a port
    #[arg(long)]
    pub no_device: bool,
}
