use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::PageConfig;
use crate::core::{Clock, Controller, Debouncer, FramePacer, IdleTimer, Key, Surface};
use crate::display::Display;
use crate::page::{Command, Page, PageRenderer};
use crate::video::VideoBridge;

use super::attract::Attract;

/// Splash colours in drawing order: blue, green, red, grey
pub const SPLASH_COLOURS: [u32; 4] = [0xff00_00ff, 0xff00_ff00, 0xffff_0000, 0xff88_8888];
/// Pause after each splash circle
const SPLASH_DELAYS_MS: [u64; 4] = [150, 250, 250, 1000];
const SPLASH_RADIUS: i32 = 100;
/// Blank screen held before and after the start-up clear
const SPLASH_SETTLE: Duration = Duration::from_secs(1);

const FRAME_RATE: f64 = 60.0;
/// Same key again within this window is ignored
const KEY_REPEAT_MS: f64 = 2000.0;

/// Draw splash circle `step` (0..4) around the centre of the surface
pub fn draw_splash_step(surface: &mut Surface, step: usize) {
    let r = SPLASH_RADIUS;
    let (hw, hh) = (surface.width() as i32 / 2, surface.height() as i32 / 2);
    let centres = [(hw - r, hh - r), (hw + r, hh - r), (hw + r, hh + r), (hw - r, hh + r)];
    if let (Some(&(x, y)), Some(&colour)) = (centres.get(step), SPLASH_COLOURS.get(step)) {
        surface.fill_circle(x, y, r, colour);
    }
}

/// Sleep owed before polling input. A frame that drew something runs on
/// without pacing.
pub fn frame_sleep(pacer: &FramePacer, animated: bool, frame_start_ms: f64, now_ms: f64) -> Option<Duration> {
    if animated {
        None
    } else {
        pacer.remaining(frame_start_ms, now_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nobody is using the kiosk; the screen saver runs
    Attracting,
    /// A page is shown and buttons act on it
    Active,
}

/// Everything the kiosk owns: display, page renderer, video and input
pub struct Kiosk {
    display: Display,
    renderer: PageRenderer,
    video: VideoBridge,
    input: Box<dyn Controller>,
    root: PathBuf,
    entry: String,
    page: Page,
    progress: usize,
    mode: Mode,
    debouncer: Debouncer,
    idle: IdleTimer,
    attract: Attract,
    last_frame_ms: f64,
    quit: bool,
}

impl Kiosk {
    pub fn new(
        display: Display,
        renderer: PageRenderer,
        video: VideoBridge,
        input: Box<dyn Controller>,
        root: impl Into<PathBuf>,
        entry: impl Into<String>,
    ) -> Self {
        let config = renderer.config();
        let attract = Attract::new(
            display.context(),
            config.attract_sprite_count.max(0.0) as usize,
            config.attract_speed,
            &SPLASH_COLOURS,
        );
        let idle = IdleTimer::new(config.idle_timeout as f64 * 1000.0, 0.0);

        Self {
            display,
            renderer,
            video,
            input,
            root: root.into(),
            entry: entry.into(),
            page: Page::default(),
            progress: 0,
            mode: Mode::Active,
            debouncer: Debouncer::new(KEY_REPEAT_MS),
            idle,
            attract,
            last_frame_ms: 0.0,
            quit: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn is_playing(&self) -> bool {
        self.video.is_playing()
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn config(&self) -> &PageConfig {
        self.renderer.config()
    }

    /// Blank pause, four coloured circles with a pause after each, then a
    /// blank screen
    pub fn splash(&mut self) {
        thread::sleep(SPLASH_SETTLE);
        self.display.clear();
        self.display.present();
        thread::sleep(SPLASH_SETTLE);
        for (step, delay) in SPLASH_DELAYS_MS.iter().enumerate() {
            draw_splash_step(self.display.surface_mut(), step);
            self.display.present();
            thread::sleep(Duration::from_millis(*delay));
        }
        self.display.clear();
    }

    /// Show the entry page in active mode
    pub fn start(&mut self, now_ms: f64) {
        self.mode = Mode::Active;
        self.idle.touch(now_ms);
        self.last_frame_ms = now_ms;
        let entry = self.entry.clone();
        if !self.load_page(&entry) {
            warn!("entry page {entry} unavailable, showing an empty page");
            self.render();
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Replace the current page. A missing page is logged and the current
    /// one stays.
    pub fn load_page(&mut self, name: &str) -> bool {
        let path = self.resolve(name);
        let page = match Page::load(&path) {
            Ok(page) => page,
            Err(e) => {
                warn!("{e}");
                return false;
            }
        };
        info!("page {}", path.display());
        self.video.stop();
        self.page = page;
        self.progress = 0;
        self.render();
        true
    }

    /// Redraw the page at the current progress and present it
    pub fn render(&mut self) {
        self.renderer
            .render(self.display.surface_mut(), &self.page, self.progress);
        self.display.present();
    }

    /// Act on a side button
    pub fn press(&mut self, index: usize, now_ms: f64) {
        self.idle.touch(now_ms);

        if self.mode == Mode::Attracting {
            info!("leaving attract mode");
            self.mode = Mode::Active;
            let entry = self.entry.clone();
            if !self.load_page(&entry) {
                self.render();
            }
            return;
        }

        let Some(button) = self.page.button(index) else {
            debug!("button {index} has no definition");
            return;
        };
        let command = button.action();
        debug!("button {index}: {command:?}");
        self.dispatch(command);
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::PlayVideo(name) => {
                self.progress = self.page.len();
                self.render();
                let path = self.resolve(&name);
                self.video.play(&path);
            }
            Command::LoadPage(name) => {
                self.load_page(&name);
            }
            Command::StopVideo => {
                self.video.stop();
                self.render();
            }
            Command::Nothing => {}
        }
    }

    /// Advance the screen saver or the reveal. Returns true if something
    /// was drawn.
    pub fn animate(&mut self, now_ms: f64) -> bool {
        let dt = ((now_ms - self.last_frame_ms).max(0.0) / 1000.0) as f32;
        self.last_frame_ms = now_ms;

        match self.mode {
            Mode::Attracting => {
                self.attract.update(dt);
                self.attract.draw(self.display.surface_mut());
                self.display.present();
                true
            }
            Mode::Active => {
                let len = self.page.len();
                if self.progress >= len {
                    return false;
                }
                let step = self.config().scroll_speed.max(1.0) as usize;
                self.progress = (self.progress + step).min(len);
                self.render();
                true
            }
        }
    }

    /// Read at most one key and act on it
    pub fn handle_input(&mut self, now_ms: f64) {
        self.input.indicate(self.mode == Mode::Attracting, now_ms);
        let Some(byte) = self.input.poll() else {
            return;
        };
        if !self.debouncer.accept(byte, now_ms) {
            return;
        }

        match Key::from_byte(byte) {
            Key::Quit => {
                info!("quit requested");
                self.quit = true;
            }
            Key::Button(index) => self.press(index, now_ms),
            Key::Other(_) if self.mode == Mode::Active => self.idle.touch(now_ms),
            Key::Other(_) => {}
        }
    }

    /// Switch to attract mode once the kiosk has been idle long enough
    pub fn check_idle(&mut self, now_ms: f64) {
        if self.mode == Mode::Active && self.idle.expired(now_ms) {
            info!("idle for {:.0} ms, entering attract mode", self.idle.idle_ms(now_ms));
            self.video.stop();
            self.mode = Mode::Attracting;
        }
    }

    /// Show new video frames; re-render once the stream has stopped
    pub fn pump_video(&mut self, now_ms: f64) {
        let update = self.video.poll();
        if update.frames > 0 {
            self.video.blit(self.display.surface_mut());
            self.display.present();
            self.idle.touch(now_ms);
        }
        if update.stopped {
            info!("video finished");
            self.video.stop();
            self.render();
        }
    }

    /// One pass of the main loop without pacing
    pub fn tick(&mut self, now_ms: f64) {
        self.animate(now_ms);
        self.handle_input(now_ms);
        self.check_idle(now_ms);
        self.pump_video(now_ms);
    }

    /// Run until quit, capped at the frame rate
    pub fn run(&mut self) {
        let clock = Clock::new();
        let pacer = FramePacer::new(FRAME_RATE);
        self.start(clock.now_ms());

        while !self.quit {
            let frame_start = clock.now_ms();
            let animated = self.animate(frame_start);
            if let Some(rest) = frame_sleep(&pacer, animated, frame_start, clock.now_ms()) {
                thread::sleep(rest);
            }

            let now = clock.now_ms();
            self.handle_input(now);
            self.check_idle(now);
            self.pump_video(now);
        }
        self.shutdown();
    }

    /// Stop video and blank the display
    pub fn shutdown(&mut self) {
        self.video.stop();
        self.display.clear();
        self.display.present();
        self.display.close();
    }
}
