use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use page_kiosk::config::PageConfig;
use page_kiosk::core::Controller;
use page_kiosk::device::{MemoryTarget, PixelDepth};
use page_kiosk::error::MediaError;
use page_kiosk::page::{BlockText, PageRenderer};
use page_kiosk::video::{FrameSink, MediaEngine, MediaPlayer, Placement, VideoBridge};
use page_kiosk::{Display, Kiosk, Mode};

/// Keys pushed by the test, read by the kiosk
#[derive(Clone, Default)]
struct ScriptedInput(Rc<RefCell<VecDeque<u8>>>);

impl ScriptedInput {
    fn press(&self, key: u8) {
        self.0.borrow_mut().push_back(key);
    }
}

impl Controller for ScriptedInput {
    fn poll(&mut self) -> Option<u8> {
        self.0.borrow_mut().pop_front()
    }
}

/// Records what the kiosk asked to play and keeps each stream's sink
#[derive(Clone, Default)]
struct ScriptedEngine(Rc<RefCell<EngineLog>>);

#[derive(Default)]
struct EngineLog {
    played: Vec<PathBuf>,
    sinks: Vec<FrameSink>,
    stops: usize,
}

struct ScriptedPlayer(Rc<RefCell<EngineLog>>);

impl MediaPlayer for ScriptedPlayer {
    fn stop(&mut self) {
        self.0.borrow_mut().stops += 1;
    }
}

impl MediaEngine for ScriptedEngine {
    fn create_instance(&mut self) -> Result<(), MediaError> {
        Ok(())
    }

    fn play(&mut self, path: &Path, sink: FrameSink) -> Result<Box<dyn MediaPlayer>, MediaError> {
        let mut log = self.0.borrow_mut();
        log.played.push(path.to_path_buf());
        log.sinks.push(sink);
        Ok(Box::new(ScriptedPlayer(Rc::clone(&self.0))))
    }

    fn release(&mut self) {}
}

struct Harness {
    kiosk: Kiosk,
    input: ScriptedInput,
    engine: ScriptedEngine,
    root: tempfile::TempDir,
}

const INDEX: &str = "\
# entry page
=Welcome=

Hello world

Second para
$Next\\npage!next.txt
$Movie!clip.mp4
$Stop!video_stop
$Broken!missing.txt
";

const NEXT: &str = "Another page\n$Back!index.txt\n";

fn harness(config: PageConfig) -> Harness {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("index.txt"), INDEX).unwrap();
    fs::write(root.path().join("next.txt"), NEXT).unwrap();

    let display = Display::new(Box::new(MemoryTarget::new(640, 480, PixelDepth::Bpp16)));
    let text = Box::new(BlockText::from_config(&config));
    let placement = Placement {
        top: config.video_pos_y as i32,
        scale_min_height: config.video_scale_min_height as u32,
    };
    let renderer = PageRenderer::new(config, text, root.path());

    let engine = ScriptedEngine::default();
    let video = VideoBridge::new(Box::new(engine.clone()), placement);
    let input = ScriptedInput::default();

    let kiosk = Kiosk::new(
        display,
        renderer,
        video,
        Box::new(input.clone()),
        root.path(),
        "index.txt",
    );
    Harness {
        kiosk,
        input,
        engine,
        root,
    }
}

fn started() -> Harness {
    let mut h = harness(PageConfig::default());
    h.kiosk.start(0.0);
    h
}

#[test]
fn test_start_shows_entry_page() {
    let h = started();
    assert_eq!(h.kiosk.mode(), Mode::Active);
    assert_eq!(h.kiosk.page().buttons.len(), 4);
    assert_eq!(h.kiosk.page().buttons[0].caption, "Next\npage");
    assert_eq!(h.kiosk.progress(), 0);
}

#[test]
fn test_reveal_advances_by_scroll_speed_and_caps() {
    let mut h = started();
    let len = h.kiosk.page().len();

    assert!(h.kiosk.animate(16.0));
    assert_eq!(h.kiosk.progress(), 5);

    let mut now = 16.0;
    while h.kiosk.progress() < len {
        now += 16.0;
        assert!(h.kiosk.animate(now));
    }
    assert_eq!(h.kiosk.progress(), len);
    assert!(!h.kiosk.animate(now + 16.0));
}

#[test]
fn test_button_loads_page() {
    let mut h = started();
    h.input.press(b'1');
    h.kiosk.tick(10.0);

    assert_eq!(h.kiosk.page().content, "Another page\n");
    assert_eq!(h.kiosk.progress(), 0);
}

#[test]
fn test_missing_page_keeps_current_content() {
    let mut h = started();
    let before = h.kiosk.page().clone();
    h.input.press(b'4');
    h.kiosk.tick(10.0);
    assert_eq!(h.kiosk.page(), &before);
}

#[test]
fn test_undefined_button_is_ignored() {
    let mut h = started();
    h.input.press(b'8');
    h.kiosk.tick(10.0);
    assert_eq!(h.kiosk.mode(), Mode::Active);
    assert!(!h.kiosk.is_quit());
}

#[test]
fn test_video_forces_full_reveal_then_plays() {
    let mut h = started();
    h.kiosk.animate(16.0);
    assert!(h.kiosk.progress() < h.kiosk.page().len());

    h.input.press(b'2');
    h.kiosk.handle_input(20.0);

    assert_eq!(h.kiosk.progress(), h.kiosk.page().len());
    assert!(h.kiosk.is_playing());
    assert_eq!(h.engine.0.borrow().played, vec![h.root.path().join("clip.mp4")]);
}

#[test]
fn test_video_frames_are_overlaid_and_stop_rerenders() {
    let mut h = started();
    h.input.press(b'2');
    h.kiosk.handle_input(20.0);

    let sink = h.engine.0.borrow().sinks[0].clone();
    sink.lock().fill(0xf800);
    sink.unlock();
    sink.display();
    h.kiosk.pump_video(30.0);

    // 2x overlay at 480 lines: 640 wide, starting at x = 0, y = VideoPosY
    let blue = 0xff00_00f8;
    assert_eq!(h.kiosk.display().surface().pixel(320, 100), Some(blue));

    sink.stopped();
    h.kiosk.pump_video(40.0);
    assert!(!h.kiosk.is_playing());
    assert_ne!(h.kiosk.display().surface().pixel(320, 100), Some(blue));
}

#[test]
fn test_stop_command_stops_video() {
    let mut h = started();
    h.input.press(b'2');
    h.kiosk.handle_input(20.0);
    h.input.press(b'3');
    h.kiosk.handle_input(30.0);

    assert!(!h.kiosk.is_playing());
    assert_eq!(h.engine.0.borrow().stops, 1);
}

#[test]
fn test_repeated_key_is_debounced() {
    let mut h = started();
    h.input.press(b'1');
    h.kiosk.handle_input(10.0);
    h.input.press(b'1');
    h.kiosk.handle_input(500.0);
    // next.txt has only one button, so a second '1' would go back to index
    assert_eq!(h.kiosk.page().content, "Another page\n");

    h.input.press(b'1');
    h.kiosk.handle_input(2010.0);
    assert!(h.kiosk.page().content.contains("Hello world"));
}

#[test]
fn test_idle_timeout_enters_attract_mode_exactly_once_exceeded() {
    let mut config = PageConfig::default();
    config.idle_timeout = 1.0;
    let mut h = harness(config);
    h.kiosk.start(0.0);

    h.kiosk.check_idle(1000.0);
    assert_eq!(h.kiosk.mode(), Mode::Active);
    h.kiosk.check_idle(1000.5);
    assert_eq!(h.kiosk.mode(), Mode::Attracting);
}

#[test]
fn test_any_button_leaves_attract_mode_on_entry_page() {
    let mut config = PageConfig::default();
    config.idle_timeout = 1.0;
    let mut h = harness(config);
    h.kiosk.start(0.0);
    h.input.press(b'1');
    h.kiosk.handle_input(10.0);
    assert_eq!(h.kiosk.page().content, "Another page\n");

    h.kiosk.check_idle(2000.0);
    assert_eq!(h.kiosk.mode(), Mode::Attracting);
    assert!(h.kiosk.animate(2016.0));

    h.input.press(b'7');
    h.kiosk.handle_input(2100.0);
    assert_eq!(h.kiosk.mode(), Mode::Active);
    assert!(h.kiosk.page().content.contains("Hello world"));
}

#[test]
fn test_video_frames_count_as_activity() {
    let mut config = PageConfig::default();
    config.idle_timeout = 1.0;
    let mut h = harness(config);
    h.kiosk.start(0.0);
    h.input.press(b'2');
    h.kiosk.handle_input(500.0);

    let sink = h.engine.0.borrow().sinks[0].clone();
    sink.display();
    h.kiosk.pump_video(1400.0);
    h.kiosk.check_idle(2000.0);
    assert_eq!(h.kiosk.mode(), Mode::Active);
}

#[test]
fn test_quit_key() {
    let mut h = started();
    h.input.press(b'q');
    h.kiosk.tick(10.0);
    assert!(h.kiosk.is_quit());

    h.kiosk.shutdown();
    assert!(!h.kiosk.display().is_open());
}

#[test]
fn test_loading_page_stops_video() {
    let mut h = started();
    h.input.press(b'2');
    h.kiosk.handle_input(20.0);
    assert!(h.kiosk.is_playing());

    h.input.press(b'1');
    h.kiosk.handle_input(30.0);
    assert!(!h.kiosk.is_playing());
    assert_eq!(h.engine.0.borrow().stops, 1);
    assert_eq!(h.kiosk.page().content, "Another page\n");
}

#[test]
fn test_attract_stops_video() {
    let mut config = PageConfig::default();
    config.idle_timeout = 1.0;
    let mut h = harness(config);
    h.kiosk.start(0.0);
    h.input.press(b'2');
    h.kiosk.handle_input(100.0);
    assert!(h.kiosk.is_playing());

    h.kiosk.check_idle(1200.0);
    assert_eq!(h.kiosk.mode(), Mode::Attracting);
    assert!(!h.kiosk.is_playing());
    assert_eq!(h.engine.0.borrow().stops, 1);
}
