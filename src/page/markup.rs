//! Markup interpreter.
//!
//! Page content is a stream of characters with a handful of control
//! characters:
//!
//! | input      | effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `\n`       | one: a space; two in a row: paragraph break              |
//! | `\` `n`    | literal newline in the current run                       |
//! | `\` `+`    | preformatted: capture up to the next newline verbatim    |
//! | `_`        | toggle bold                                              |
//! | `=`        | toggle heading (centred, larger)                         |
//! | `[` .. `]` | image block; the text between is the image path         |
//!
//! Layout is a pure function of the content and the number of characters
//! revealed so far. Every call starts again from the first character.

use crate::config::PageConfig;
use crate::core::DisplayContext;

use super::image_cache::ImageCache;
use super::text::{FontStyle, TextBackend};

/// A positioned piece of page output
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    /// One line of text with its baseline at `y`
    Text {
        x: f32,
        y: f32,
        text: String,
        style: FontStyle,
    },
    /// An image scaled to the column, top-left at (`x`, `y`)
    Image {
        path: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Output of [`layout_page`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub runs: Vec<Run>,
    /// Runs before this index were ended by markup inside the revealed
    /// prefix; later runs hold text still being typed out.
    pub committed: usize,
}

impl Layout {
    pub fn committed_runs(&self) -> &[Run] {
        &self.runs[..self.committed]
    }
}

/// Services the layout needs besides the content itself
pub struct LayoutEnv<'a> {
    pub config: &'a PageConfig,
    pub text: &'a dyn TextBackend,
    pub images: &'a mut ImageCache,
    pub display: DisplayContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preformat {
    Off,
    Capturing,
    Flushing,
}

struct Cursor<'e, 'a> {
    env: &'e mut LayoutEnv<'a>,
    x: f32,
    y: f32,
    bold: bool,
    heading: bool,
    image: bool,
    preformat: Preformat,
    runs: Vec<Run>,
}

impl<'e, 'a> Cursor<'e, 'a> {
    fn new(env: &'e mut LayoutEnv<'a>) -> Self {
        let (x, y) = (env.config.margin_x, env.config.margin_y);
        Self {
            env,
            x,
            y,
            bold: false,
            heading: false,
            image: false,
            preformat: Preformat::Off,
            runs: Vec::new(),
        }
    }

    fn column_width(&self) -> f32 {
        self.env.display.column_width(self.env.config.margin_x)
    }

    fn styled(&self) -> bool {
        self.bold || self.heading || self.image || self.preformat != Preformat::Off
    }

    fn flush(&mut self, text: &mut String) {
        let text = std::mem::take(text);
        if text.is_empty() {
            return;
        }
        if self.styled() {
            self.styled_line(text);
        } else {
            self.wrapped(&text);
        }
        self.x = self.env.config.margin_x;
    }

    fn wrapped(&mut self, text: &str) {
        let style = FontStyle::normal(self.env.config.font_size_normal);
        let backend = self.env.text;
        let line_height = backend.line_height(style);
        let lines = wrap_text(text, self.column_width(), |s| backend.measure(s, style).width);

        for line in lines {
            if !line.is_empty() {
                self.runs.push(Run::Text {
                    x: self.x,
                    y: self.y,
                    text: line,
                    style,
                });
            }
            self.y += line_height;
        }
    }

    fn styled_line(&mut self, text: String) {
        let config = self.env.config;
        let size = if self.heading {
            config.font_size_heading
        } else {
            config.font_size_normal
        };
        let style = FontStyle { size, bold: self.bold };
        let x = if self.heading {
            let width = self.env.text.measure(&text, style).width;
            self.env.display.centred_x(width)
        } else {
            self.x
        };

        self.runs.push(Run::Text {
            x,
            y: self.y,
            text,
            style,
        });
        self.y += self.env.text.line_height(style);
    }

    fn place_image(&mut self, path: &mut String) {
        let path = std::mem::take(path);
        if path.is_empty() {
            return;
        }
        let (w, h) = self.env.images.dimensions(&path);
        let width = self.column_width();
        let height = if w > 0 { width * h as f32 / w as f32 } else { 0.0 };

        self.runs.push(Run::Image {
            path,
            x: self.x,
            y: self.y,
            width,
            height,
        });
        self.x = self.env.config.margin_x;
        self.y += height + self.env.config.char_height;
    }
}

/// Lay out the first `limit` characters of `content`
pub fn layout_page(content: &str, limit: usize, env: &mut LayoutEnv<'_>) -> Layout {
    let chars: Vec<char> = content.chars().take(limit).collect();
    let mut cursor = Cursor::new(env);
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if cursor.preformat == Preformat::Capturing {
            if c == '\n' {
                cursor.preformat = Preformat::Flushing;
            } else {
                current.push(c);
                i += 1;
                continue;
            }
        }

        match c {
            '\\' => {
                i += 1;
                if let Some(&next) = chars.get(i) {
                    match next {
                        'n' => current.push('\n'),
                        '+' => cursor.preformat = Preformat::Capturing,
                        _ => {}
                    }
                    i += 1;
                }
                continue;
            }
            '_' => {
                cursor.flush(&mut current);
                cursor.bold = !cursor.bold;
            }
            '=' => {
                cursor.flush(&mut current);
                cursor.heading = !cursor.heading;
            }
            '[' => {
                cursor.flush(&mut current);
                cursor.image = true;
            }
            ']' => {
                cursor.place_image(&mut current);
                cursor.image = false;
            }
            '\n' => {
                if cursor.preformat == Preformat::Flushing {
                    cursor.flush(&mut current);
                    cursor.preformat = Preformat::Off;
                } else if i > 0 && chars[i - 1] == '\n' {
                    cursor.flush(&mut current);
                } else {
                    current.push(' ');
                }
            }
            c => current.push(c),
        }
        i += 1;
    }

    let committed = cursor.runs.len();
    if !cursor.image {
        cursor.flush(&mut current);
    }
    Layout {
        runs: cursor.runs,
        committed,
    }
}

/// Greedy word wrap.
///
/// Words are separated by spaces or newlines. A word wider than
/// `max_width` on its own is placed alone on its line. The last line is
/// always returned, even when empty.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split([' ', '\n']).filter(|w| !w.is_empty()) {
        let extended = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };

        if !line.is_empty() && measure(&extended) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = extended;
        }
    }
    lines.push(line);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::text::BlockText;

    fn text_runs(layout: &Layout) -> Vec<(f32, f32, &str)> {
        layout
            .runs
            .iter()
            .filter_map(|run| match run {
                Run::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                Run::Image { .. } => None,
            })
            .collect()
    }

    fn layout(content: &str, limit: usize) -> Layout {
        let config = PageConfig::default();
        let text = BlockText::from_config(&config);
        let mut images = ImageCache::new("/nonexistent");
        let mut env = LayoutEnv {
            config: &config,
            text: &text,
            images: &mut images,
            display: DisplayContext::new(640, 480),
        };
        layout_page(content, limit, &mut env)
    }

    fn full(content: &str) -> Layout {
        layout(content, usize::MAX)
    }

    #[test]
    fn test_paragraphs_land_on_separate_lines() {
        let result = full("Hello world\n\nSecond para");
        assert_eq!(
            text_runs(&result),
            vec![(100.0, 20.0, "Hello world"), (100.0, 42.0, "Second para")]
        );
        assert_eq!(result.committed, 1);
    }

    #[test]
    fn test_single_newline_is_a_space() {
        let result = full("one\ntwo\n");
        assert_eq!(text_runs(&result), vec![(100.0, 20.0, "one two")]);
    }

    #[test]
    fn test_bold_flushes_and_toggles() {
        let result = full("plain _bold_ after");
        let runs = &result.runs;
        assert_eq!(runs.len(), 3);
        match &runs[1] {
            Run::Text { text, style, .. } => {
                assert_eq!(text, "bold");
                assert!(style.bold);
            }
            other => panic!("unexpected run {other:?}"),
        }
        match &runs[2] {
            Run::Text { style, .. } => assert!(!style.bold),
            other => panic!("unexpected run {other:?}"),
        }
    }

    #[test]
    fn test_heading_is_centred_and_larger() {
        let result = full("=Title=");
        match &result.runs[0] {
            Run::Text { x, text, style, .. } => {
                assert_eq!(text, "Title");
                assert_eq!(style.size, 18.0);
                let width = 5.0 * 5.0 * 18.0 / 14.0;
                assert!((x - (640.0 - width) / 2.0).abs() < 0.01);
            }
            other => panic!("unexpected run {other:?}"),
        }
    }

    #[test]
    fn test_escapes() {
        let result = full("_a\\nb\\xc_");
        assert_eq!(text_runs(&result), vec![(100.0, 20.0, "a\nbc")]);
    }

    #[test]
    fn test_preformat_keeps_markup_characters() {
        let result = full("\\+ x = _y_ [z]\nnext");
        let runs = text_runs(&result);
        assert_eq!(runs[0], (100.0, 20.0, " x = _y_ [z]"));
        assert_eq!(runs[1], (100.0, 42.0, "next"));
    }

    #[test]
    fn test_image_block() {
        let result = full("[pic.png]after");
        match &result.runs[0] {
            Run::Image {
                path,
                x,
                y,
                width,
                height,
            } => {
                assert_eq!(path, "pic.png");
                assert_eq!((*x, *y), (100.0, 20.0));
                assert_eq!(*width, 440.0);
                assert_eq!(*height, 330.0);
            }
            other => panic!("unexpected run {other:?}"),
        }
        assert_eq!(text_runs(&result), vec![(100.0, 20.0 + 330.0 + 18.0, "after")]);
    }

    #[test]
    fn test_unterminated_image_draws_nothing() {
        let result = full("[pic.p");
        assert!(result.runs.is_empty());
    }

    #[test]
    fn test_limit_stops_reading() {
        let result = layout("Hello world", 5);
        assert_eq!(text_runs(&result), vec![(100.0, 20.0, "Hello")]);
        assert_eq!(result.committed, 0);
        assert!(layout("Hello", 0).runs.is_empty());
    }

    #[test]
    fn test_long_text_wraps_within_column() {
        let content = "word ".repeat(40);
        let result = full(&content);
        let runs = text_runs(&result);
        assert!(runs.len() > 1);
        for (_, _, line) in runs {
            assert!(line.chars().count() as f32 * 5.0 <= 440.0);
        }
    }

    #[test]
    fn test_wrap_text_places_long_word_alone() {
        let measure = |s: &str| s.len() as f32;
        let lines = wrap_text("ab averyveryverylongword cd", 10.0, measure);
        assert_eq!(lines, vec!["ab", "averyveryverylongword", "cd"]);

        let lines = wrap_text("averyveryverylongword", 10.0, measure);
        assert_eq!(lines, vec!["averyveryverylongword"]);
    }

    #[test]
    fn test_wrap_text_empty_input() {
        assert_eq!(wrap_text("   ", 10.0, |s| s.len() as f32), vec![String::new()]);
    }
}
