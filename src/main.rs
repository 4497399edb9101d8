use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use page_kiosk::cli::Cli;
use page_kiosk::input;
use page_kiosk::page::{self, PageRenderer};
use page_kiosk::video::{FfmpegEngine, Placement, VideoBridge};
use page_kiosk::{Display, Kiosk, PageConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let root = cli.root();

    let display = Display::open_framebuffer(&cli.device)
        .with_context(|| format!("opening {}", cli.device.display()))?;

    let config_path = root.join(PageConfig::file_name(display.context()));
    let config = PageConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let text = page::text::backend_for(&config);
    let placement = Placement {
        top: config.video_pos_y as i32,
        scale_min_height: config.video_scale_min_height.max(0.0) as u32,
    };
    let video = VideoBridge::new(Box::new(FfmpegEngine::new(&cli.ffmpeg)), placement);
    let renderer = PageRenderer::new(config, text, &root);
    let input = input::for_run(cli.headless);

    info!("content root {}", root.display());
    let mut kiosk = Kiosk::new(display, renderer, video, Box::new(input), &root, cli.entry.clone());
    kiosk.splash();
    kiosk.run();

    info!("bye");
    Ok(())
}
