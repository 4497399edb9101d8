use crate::config::PageConfig;
use crate::core::Surface;

use super::image_cache::ImageCache;
use super::markup::{Layout, Run};
use super::source::Button;
use super::text::{FontStyle, TextBackend};

/// Buttons drawn down each side of the screen
pub const BUTTONS_PER_SIDE: usize = 4;

/// Screen rectangle of a side button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Where button `index` sits; 0..=3 down the left, 4..=7 down the right
pub fn button_rect(index: usize, config: &PageConfig, surface_width: u32) -> ButtonRect {
    let side = index / BUTTONS_PER_SIDE;
    let num = (index % BUTTONS_PER_SIDE) as f32;
    let left = if side == 0 {
        0.0
    } else {
        surface_width as f32 - config.margin_x
    };

    ButtonRect {
        x: (left + config.button_border) as i32,
        y: (config.button_height / 2.0 + num * 2.0 * config.button_height + config.button_border) as i32,
        width: (config.margin_x - config.button_border * 2.0) as i32,
        height: (config.button_height - config.button_border * 2.0) as i32,
    }
}

/// Draws laid-out pages and side buttons onto a surface
pub struct Painter<'a> {
    pub config: &'a PageConfig,
    pub text: &'a dyn TextBackend,
}

impl Painter<'_> {
    /// Draw every run of a layout
    pub fn layout(&self, surface: &mut Surface, layout: &Layout, images: &mut ImageCache) {
        for run in &layout.runs {
            match run {
                Run::Text { x, y, text, style } => self.text_line(surface, text, *x, *y, *style),
                Run::Image {
                    path,
                    x,
                    y,
                    width,
                    height,
                } => self.image(surface, images, path, *x, *y, *width, *height),
            }
        }
    }

    /// Background box then glyphs, baseline at `y`
    fn text_line(&self, surface: &mut Surface, text: &str, x: f32, y: f32, style: FontStyle) {
        let extents = self.text.measure(text, style);
        surface.fill_rect(
            x as i32,
            (y - extents.height + 2.0) as i32,
            extents.width.ceil() as i32,
            extents.height.ceil() as i32,
            self.config.text_background_colour.to_argb(),
        );
        self.text
            .draw(surface, text, x, y, style, self.config.text_colour.to_argb());
    }

    #[allow(clippy::too_many_arguments)]
    fn image(
        &self,
        surface: &mut Surface,
        images: &mut ImageCache,
        path: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        let (w, h) = (width.round() as u32, height.round() as u32);
        if w == 0 || h == 0 {
            return;
        }
        let (x, y) = (x as i32, y as i32);
        let rows = (surface.height() as i32 - y).clamp(0, h as i32) as u32;
        if rows > 0 {
            let band = images.scaled(path, w, h, rows);
            surface.blit_rgba(band.as_raw(), w, rows, x, y);
        }
        surface.stroke_rect(
            x - 1,
            y - 1,
            w as i32 + 2,
            h as i32 + 2,
            self.config.image_border_colour.to_argb(),
        );
    }

    /// Outline and caption for the first eight buttons
    pub fn buttons(&self, surface: &mut Surface, buttons: &[Button]) {
        let colour = self.config.button_colour.to_argb();
        let style = FontStyle::bold(self.config.font_size_normal);

        for (index, button) in buttons.iter().take(BUTTONS_PER_SIDE * 2).enumerate() {
            let rect = button_rect(index, self.config, surface.width());
            surface.stroke_rect(rect.x, rect.y, rect.width, rect.height, colour);

            let (text_width, text_height) = self.caption_size(&button.caption, style);
            let x = rect.x as f32 + (rect.width as f32 - text_width) / 2.0;
            let y = rect.y as f32 + (rect.height / 2) as f32 - text_height / 2.0;
            self.caption(surface, &button.caption, x, y, style, colour);
        }
    }

    fn caption_size(&self, caption: &str, style: FontStyle) -> (f32, f32) {
        let line_height = self.text.line_height(style);
        let width = caption
            .split('\n')
            .map(|line| self.text.measure(line, style).width)
            .fold(0.0, f32::max);
        let lines = caption.trim_end_matches('\n').split('\n').count();
        (width, lines as f32 * line_height)
    }

    /// Lines of a caption, first baseline one line below `y`
    fn caption(&self, surface: &mut Surface, caption: &str, x: f32, y: f32, style: FontStyle, colour: u32) {
        let line_height = self.text.line_height(style);
        let mut baseline = y;
        for line in caption.split('\n') {
            baseline += line_height;
            if !line.is_empty() {
                self.text.draw(surface, line, x, baseline, style, colour);
            }
        }
    }
}
