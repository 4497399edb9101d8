use proptest::prelude::*;

use page_kiosk::config::PageConfig;
use page_kiosk::core::color::{argb, argb_to_rgb565, rgb565_to_argb};
use page_kiosk::core::DisplayContext;
use page_kiosk::page::{layout_page, wrap_text, BlockText, ImageCache, Layout, LayoutEnv, Page, Run, TextBackend};

fn layout(content: &str, limit: usize) -> Layout {
    let config = PageConfig::default();
    let text = BlockText::from_config(&config);
    let mut images = ImageCache::new("/nonexistent");
    let mut env = LayoutEnv {
        config: &config,
        text: &text,
        images: &mut images,
        display: DisplayContext::new(480, 320),
    };
    layout_page(content, limit, &mut env)
}

/// Page-like text built from words, markup and paragraph breaks
fn markup() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        4 => "[a-z]{1,12}".prop_map(|w| format!("{w} ")),
        1 => Just("\n".to_string()),
        1 => Just("\n\n".to_string()),
        1 => Just("_".to_string()),
        1 => Just("=".to_string()),
        1 => Just("\\n".to_string()),
        1 => Just("\\+".to_string()),
        1 => Just("[pic.png]".to_string()),
    ];
    prop::collection::vec(token, 0..40).prop_map(|tokens| tokens.concat())
}

proptest! {
    #[test]
    fn wrapped_lines_fit_unless_single_word(
        words in prop::collection::vec("[a-zA-Z]{1,30}", 0..30),
        max_width in 20.0f32..200.0,
    ) {
        let text = words.join(" ");
        let measure = |s: &str| s.chars().count() as f32 * 5.0;
        for line in wrap_text(&text, max_width, measure) {
            prop_assert!(measure(&line) <= max_width || !line.contains(' '), "{line:?}");
        }
    }

    #[test]
    fn wrapping_keeps_every_word_in_order(words in prop::collection::vec("[a-z]{1,15}", 1..30)) {
        let text = words.join(" ");
        let lines = wrap_text(&text, 60.0, |s| s.len() as f32 * 5.0);
        let rejoined: Vec<String> = lines
            .iter()
            .flat_map(|line| line.split(' '))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        prop_assert_eq!(rejoined, words);
    }

    #[test]
    fn committed_runs_survive_further_reveal(content in markup(), a in 0usize..400, b in 0usize..400) {
        let (short, long) = (a.min(b), a.max(b));
        let earlier = layout(&content, short);
        let later = layout(&content, long);
        prop_assert!(later.runs.len() >= earlier.committed);
        prop_assert_eq!(earlier.committed_runs(), &later.runs[..earlier.committed]);
    }

    #[test]
    fn layout_is_deterministic(content in markup(), limit in 0usize..400) {
        prop_assert_eq!(layout(&content, limit), layout(&content, limit));
    }

    #[test]
    fn rgb565_round_trip_keeps_top_bits(r: u8, g: u8, b: u8) {
        let back = rgb565_to_argb(argb_to_rgb565(argb(r, g, b)));
        prop_assert_eq!(back, argb(r & 0xf8, g & 0xfc, b & 0xf8));
    }
}

#[test]
fn test_hello_world_two_paragraphs() {
    let result = layout("Hello world\n\nSecond para", usize::MAX);
    let lines: Vec<(f32, &str)> = result
        .runs
        .iter()
        .map(|run| match run {
            Run::Text { y, text, .. } => (*y, text.as_str()),
            Run::Image { .. } => panic!("no images expected"),
        })
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].1, "Hello world");
    assert_eq!(lines[1].1, "Second para");
    assert!(lines[1].0 > lines[0].0);
}

#[test]
fn test_page_file_to_layout() {
    let page = Page::parse("=Title=\n\nbody text\n$A\\nB!page.txt\n$Label\n");
    assert_eq!(page.buttons[0].caption, "A\nB");
    assert_eq!(page.buttons[0].command, "page.txt");
    assert_eq!(page.buttons[1].command, "");

    let result = layout(&page.content, page.len());
    let config = PageConfig::default();
    let text = BlockText::from_config(&config);
    match &result.runs[0] {
        Run::Text { x, text: title, style, .. } => {
            assert_eq!(title, "Title");
            let width = text.measure("Title", *style).width;
            assert!((x - (480.0 - width) / 2.0).abs() < 0.01);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_long_word_is_alone_on_its_line() {
    let content = format!("a {} b", "x".repeat(100));
    let result = layout(&content, usize::MAX);
    let texts: Vec<&str> = result
        .runs
        .iter()
        .filter_map(|run| match run {
            Run::Text { text, .. } => Some(text.as_str()),
            Run::Image { .. } => None,
        })
        .collect();
    assert_eq!(texts, vec!["a", "x".repeat(100).as_str(), "b"]);
}
