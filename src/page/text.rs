//! Text metrics and glyph drawing.
//!
//! Layout only needs measurements; the painter also draws. Both go through
//! [`TextBackend`] so pages can be laid out against a fixed-metric backend
//! in tests and against TrueType fonts on a real display.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use log::{info, warn};

use crate::config::PageConfig;
use crate::core::Surface;
use crate::error::KioskError;

/// Fonts tried when the config names none
const FONT_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Bold.ttf",
    ),
];

/// Size and weight of a piece of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    pub size: f32,
    pub bold: bool,
}

impl FontStyle {
    pub fn normal(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }
}

/// Ink extents of a string
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extents {
    pub width: f32,
    pub height: f32,
}

pub trait TextBackend {
    /// Width and ink height of `text` in the given style
    fn measure(&self, text: &str, style: FontStyle) -> Extents;

    /// Draw `text` with its baseline at `baseline`
    fn draw(&self, surface: &mut Surface, text: &str, x: f32, baseline: f32, style: FontStyle, colour: u32);

    /// Distance between consecutive baselines
    fn line_height(&self, style: FontStyle) -> f32 {
        self.measure("My", style).height + 4.0
    }
}

/// Fixed-cell text: every glyph is a solid block.
///
/// Cells are `char_width` x `char_height` at `base_size` and scale linearly
/// with the requested size. Used when no TrueType font can be loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockText {
    pub char_width: f32,
    pub char_height: f32,
    pub base_size: f32,
}

impl BlockText {
    pub fn new(char_width: f32, char_height: f32, base_size: f32) -> Self {
        Self {
            char_width,
            char_height,
            base_size,
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(config.char_width, config.char_height, config.font_size_normal)
    }

    fn scale(&self, style: FontStyle) -> f32 {
        if self.base_size > 0.0 {
            style.size / self.base_size
        } else {
            1.0
        }
    }
}

impl TextBackend for BlockText {
    fn measure(&self, text: &str, style: FontStyle) -> Extents {
        let scale = self.scale(style);
        let count = text.chars().count() as f32;
        let has_ink = text.chars().any(|c| !c.is_whitespace());
        Extents {
            width: count * self.char_width * scale,
            height: if has_ink { self.char_height * scale } else { 0.0 },
        }
    }

    fn draw(&self, surface: &mut Surface, text: &str, x: f32, baseline: f32, style: FontStyle, colour: u32) {
        let scale = self.scale(style);
        let cell = self.char_width * scale;
        let height = (self.char_height * scale).round() as i32;
        let inset = if style.bold { 0 } else { 1 };
        let top = baseline.round() as i32 - height;

        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = (x + i as f32 * cell).round() as i32;
            let width = (cell.round() as i32 - inset).max(1);
            surface.fill_rect(left, top, width, height, colour);
        }
    }
}

/// TrueType text rendered with fontdue
pub struct FontdueText {
    regular: Font,
    bold: Option<Font>,
}

impl FontdueText {
    /// Load a regular face and an optional bold face
    pub fn load(regular: &Path, bold: Option<&Path>) -> Result<Self, KioskError> {
        let regular = load_font(regular)?;
        let bold = match bold {
            Some(path) => match load_font(path) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!("{e}; bold text uses the regular face");
                    None
                }
            },
            None => None,
        };
        Ok(Self { regular, bold })
    }

    /// Fonts named in the config, else the first installed candidate
    pub fn discover(config: &PageConfig) -> Option<Self> {
        if let Some(regular) = &config.font_path {
            let bold = config.font_bold_path.as_deref().map(Path::new);
            return match Self::load(Path::new(regular), bold) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("{e}");
                    None
                }
            };
        }

        FONT_CANDIDATES.iter().find_map(|(regular, bold)| {
            let regular = PathBuf::from(regular);
            if !regular.exists() {
                return None;
            }
            let bold = PathBuf::from(bold);
            let bold = bold.exists().then_some(bold.as_path());
            match Self::load(&regular, bold) {
                Ok(text) => {
                    info!("using font {}", regular.display());
                    Some(text)
                }
                Err(e) => {
                    warn!("{e}");
                    None
                }
            }
        })
    }

    fn face(&self, style: FontStyle) -> &Font {
        match (&self.bold, style.bold) {
            (Some(bold), true) => bold,
            _ => &self.regular,
        }
    }
}

fn load_font(path: &Path) -> Result<Font, KioskError> {
    let font_error = |reason: String| KioskError::Font {
        path: path.to_path_buf(),
        reason,
    };
    let data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
    Font::from_bytes(data, FontSettings::default()).map_err(|e| font_error(e.to_string()))
}

impl TextBackend for FontdueText {
    fn measure(&self, text: &str, style: FontStyle) -> Extents {
        let font = self.face(style);
        let mut width = 0.0;
        let mut top = f32::MIN;
        let mut bottom = f32::MAX;

        for c in text.chars() {
            let metrics = font.metrics(c, style.size);
            width += metrics.advance_width;
            if metrics.height > 0 {
                top = top.max((metrics.ymin + metrics.height as i32) as f32);
                bottom = bottom.min(metrics.ymin as f32);
            }
        }

        let height = if top >= bottom { top - bottom } else { 0.0 };
        Extents { width, height }
    }

    fn draw(&self, surface: &mut Surface, text: &str, x: f32, baseline: f32, style: FontStyle, colour: u32) {
        let font = self.face(style);
        let baseline = baseline.round() as i32;
        let mut pen = x;

        for c in text.chars() {
            let (metrics, bitmap) = font.rasterize(c, style.size);
            let left = pen.round() as i32 + metrics.xmin;
            let top = baseline - metrics.ymin - metrics.height as i32;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    if coverage > 0 {
                        surface.blend_pixel(left + col as i32, top + row as i32, colour, coverage);
                    }
                }
            }
            pen += metrics.advance_width;
        }
    }
}

/// Best available backend for a config
pub fn backend_for(config: &PageConfig) -> Box<dyn TextBackend> {
    match FontdueText::discover(config) {
        Some(text) => Box::new(text),
        None => {
            warn!("no TrueType font available, using block text");
            Box::new(BlockText::from_config(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> BlockText {
        BlockText::new(5.0, 18.0, 14.0)
    }

    #[test]
    fn test_block_measure_scales_with_size() {
        let text = block();
        assert_eq!(
            text.measure("Hello", FontStyle::normal(14.0)),
            Extents {
                width: 25.0,
                height: 18.0
            }
        );
        let big = text.measure("Hi", FontStyle::normal(28.0));
        assert_eq!(big.width, 20.0);
        assert_eq!(big.height, 36.0);
    }

    #[test]
    fn test_block_whitespace_has_width_but_no_ink() {
        let extents = block().measure("   ", FontStyle::normal(14.0));
        assert_eq!(extents.width, 15.0);
        assert_eq!(extents.height, 0.0);
    }

    #[test]
    fn test_line_height_is_my_plus_four() {
        assert_eq!(block().line_height(FontStyle::normal(14.0)), 22.0);
    }

    #[test]
    fn test_block_draw_places_cells_above_baseline() {
        let mut surface = Surface::new(40, 40);
        block().draw(&mut surface, "A B", 0.0, 30.0, FontStyle::bold(14.0), 0xffffffff);

        assert_eq!(surface.pixel(0, 12), Some(0xffffffff));
        assert_eq!(surface.pixel(4, 29), Some(0xffffffff));
        assert_eq!(surface.pixel(0, 30), Some(0xff000000));
        assert_eq!(surface.pixel(7, 20), Some(0xff000000)); // the space
        assert_eq!(surface.pixel(10, 20), Some(0xffffffff));
    }

    #[test]
    fn test_missing_font_is_reported() {
        let err = FontdueText::load(Path::new("/no/such/font.ttf"), None).err().unwrap();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("/no/such/font.ttf"));
    }
}
