//! Pages: file format, markup layout and painting.

pub mod image_cache;
pub mod markup;
pub mod paint;
pub mod source;
pub mod text;

pub use image_cache::ImageCache;
pub use markup::{layout_page, wrap_text, Layout, LayoutEnv, Run};
pub use paint::{button_rect, ButtonRect, Painter};
pub use source::{Button, Command, Page, STOP_VIDEO};
pub use text::{BlockText, Extents, FontStyle, FontdueText, TextBackend};

use std::path::PathBuf;

use crate::config::PageConfig;
use crate::core::Surface;

/// Turns a page and its reveal progress into pixels
pub struct PageRenderer {
    config: PageConfig,
    text: Box<dyn TextBackend>,
    images: ImageCache,
}

impl PageRenderer {
    pub fn new(config: PageConfig, text: Box<dyn TextBackend>, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            text,
            images: ImageCache::new(root),
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Lay out the first `progress` characters without drawing
    pub fn layout(&mut self, page: &Page, progress: usize, surface: &Surface) -> Layout {
        let mut env = LayoutEnv {
            config: &self.config,
            text: self.text.as_ref(),
            images: &mut self.images,
            display: surface.context(),
        };
        layout_page(&page.content, progress, &mut env)
    }

    /// Clear, then draw the side buttons and the revealed content
    pub fn render(&mut self, surface: &mut Surface, page: &Page, progress: usize) -> Layout {
        let layout = self.layout(page, progress, surface);

        surface.clear();
        let painter = Painter {
            config: &self.config,
            text: self.text.as_ref(),
        };
        painter.buttons(surface, &page.buttons);
        painter.layout(surface, &layout, &mut self.images);
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> PageRenderer {
        let config = PageConfig::default();
        let text = Box::new(BlockText::from_config(&config));
        PageRenderer::new(config, text, "/nonexistent")
    }

    #[test]
    fn test_render_is_a_pure_function_of_progress() {
        let page = Page::parse("$Back!index.txt\nSome _bold_ text\n\nand more\n");
        let mut renderer = renderer();

        let mut first = Surface::new(320, 240);
        renderer.render(&mut first, &page, 12);
        let mut dirty = Surface::new(320, 240);
        renderer.render(&mut dirty, &page, page.len());
        renderer.render(&mut dirty, &page, 12);

        assert!(first.pixels() == dirty.pixels());
    }

    #[test]
    fn test_render_draws_buttons_with_no_content() {
        let page = Page::parse("$Go!next.txt\n");
        let mut renderer = renderer();
        let mut surface = Surface::new(320, 240);
        let layout = renderer.render(&mut surface, &page, 0);

        assert!(layout.runs.is_empty());
        let rect = button_rect(0, renderer.config(), 320);
        assert_eq!(
            surface.pixel(rect.x, rect.y),
            Some(renderer.config().button_colour.to_argb())
        );
    }
}
