// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "page-kiosk")]
#[command(about = "Framebuffer page kiosk with video overlay", long_about = None)]
pub struct Cli {
    /// Run without keyboard input and leave the terminal untouched
    #[arg(long = "headless", default_value = "false")]
    pub headless: bool,

    /// Framebuffer device
    #[arg(long = "device", default_value = "/dev/fb0")]
    pub device: PathBuf,

    /// Page shown at start and when leaving attract mode
    #[arg(long = "entry", default_value = "index.txt")]
    pub entry: String,

    /// ffmpeg executable used to decode video
    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Content directory; when several are given the last one wins
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,
}

impl Cli {
    pub fn root(&self) -> PathBuf {
        self.roots.last().cloned().unwrap_or_else(|| PathBuf::from("."))
    }
}
