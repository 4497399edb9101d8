use super::color::{self, OPAQUE_BLACK};
use super::display_context::DisplayContext;

/// Off-screen working buffer - always one `0xAARRGGBB` word per pixel
///
/// Every write is bounds checked; coordinates outside the surface are
/// silently dropped so callers can draw partially visible shapes.
#[derive(Clone)]
pub struct Surface {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl Surface {
    /// Create a surface filled with opaque black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![OPAQUE_BLACK; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    pub fn context(&self) -> DisplayContext {
        DisplayContext::new(self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel words, row-major with no padding
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel bytes in memory order (B, G, R, A per pixel)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Fill with opaque black
    pub fn clear(&mut self) {
        self.fill(OPAQUE_BLACK);
    }

    pub fn fill(&mut self, colour: u32) {
        self.pixels.fill(colour);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, colour: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = colour;
        }
    }

    /// Blend `colour` over the existing pixel with 8-bit coverage
    pub fn blend_pixel(&mut self, x: i32, y: i32, colour: u32, coverage: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = match coverage {
                0 => return,
                255 => colour,
                c => color::blend(colour, self.pixels[i], c),
            };
        }
    }

    /// Filled axis-aligned rectangle, clipped to the surface
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, colour: u32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            let start = row * stride;
            self.pixels[start + x0..start + x1].fill(colour);
        }
    }

    /// One pixel wide rectangle outline
    pub fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, colour: u32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (right, bottom) = (x + width - 1, y + height - 1);
        self.plot_line(x, y, right, y, colour);
        self.plot_line(right, y, right, bottom, colour);
        self.plot_line(right, bottom, x, bottom, colour);
        self.plot_line(x, bottom, x, y, colour);
    }

    /// Intersect a rectangle with the surface, returning half-open bounds
    fn clip(&self, x: i32, y: i32, width: i32, height: i32) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(self.width as i32);
        let y1 = y.saturating_add(height).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    /// Copy a decoder frame (blue in the high bits) at 2x nearest-neighbour
    pub fn blit_bgr565_scaled2x(&mut self, src: &[u16], width: u32, height: u32, x: i32, y: i32) {
        self.blit_bgr565_scaled(src, width, height, x, y, 2);
    }

    /// Copy a decoder frame (blue in the high bits) at 1:1
    pub fn blit_bgr565(&mut self, src: &[u16], width: u32, height: u32, x: i32, y: i32) {
        self.blit_bgr565_scaled(src, width, height, x, y, 1);
    }

    fn blit_bgr565_scaled(&mut self, src: &[u16], width: u32, height: u32, x: i32, y: i32, scale: u32) {
        let scale = scale.max(1) as i32;
        let (w, h) = (width as i32, height as i32);
        if src.len() < (width as usize) * (height as usize) {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w * scale, h * scale) else {
            return;
        };
        let stride = self.width as usize;
        for dy in y0..y1 {
            let sy = (dy as i32 - y) / scale;
            let src_row = &src[(sy * w) as usize..((sy + 1) * w) as usize];
            let dst_row = &mut self.pixels[dy * stride..(dy + 1) * stride];
            for dx in x0..x1 {
                let sx = (dx as i32 - x) / scale;
                dst_row[dx] = color::bgr565_to_argb(src_row[sx as usize]);
            }
        }
    }

    /// Draw an RGBA8 image (straight alpha) at a position
    pub fn blit_rgba(&mut self, src: &[u8], width: u32, height: u32, x: i32, y: i32) {
        if src.len() < (width as usize) * (height as usize) * 4 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width as i32, height as i32) else {
            return;
        };
        for dy in y0..y1 {
            let sy = (dy as i32 - y) as usize;
            for dx in x0..x1 {
                let sx = (dx as i32 - x) as usize;
                let i = (sy * width as usize + sx) * 4;
                let colour = color::argb(src[i], src[i + 1], src[i + 2]);
                self.blend_pixel(dx as i32, dy as i32, colour, src[i + 3]);
            }
        }
    }
}
