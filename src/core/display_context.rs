/// Display context - contains surface dimensions and layout helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayContext {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl DisplayContext {
    /// Create new display context
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Width left for content between two equal side margins
    pub fn column_width(&self, margin: f32) -> f32 {
        (self.width as f32 - margin * 2.0).max(0.0)
    }

    /// Left edge that horizontally centres an item of the given width
    pub fn centred_x(&self, item_width: f32) -> f32 {
        (self.width as f32 - item_width) / 2.0
    }
}
