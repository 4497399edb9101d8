use std::path::Path;
use std::thread;
use std::time::Duration;

use log::info;

use crate::core::{DisplayContext, Surface};
use crate::device::{self, FbDevice, PixelDepth, PresentTarget};
use crate::error::KioskError;

/// Delay between the two start-up clears
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Display combines the working surface with the physical output
///
/// All drawing goes to the surface; `present` is the only operation that
/// touches the target.
pub struct Display {
    surface: Surface,
    target: Option<Box<dyn PresentTarget>>,
    depth: PixelDepth,
}

impl Display {
    /// Wrap a target with a surface of matching size, no start-up flush
    pub fn new(target: Box<dyn PresentTarget>) -> Self {
        let info = target.info();
        Self {
            surface: Surface::new(info.width, info.height),
            target: Some(target),
            depth: info.depth,
        }
    }

    /// Wrap a target and flush stale content left by other processes
    pub fn open(target: Box<dyn PresentTarget>) -> Self {
        let mut display = Self::new(target);
        display.clear();
        display.present();
        thread::sleep(SETTLE_DELAY);
        display.clear();
        display.present();
        display
    }

    /// Open a Linux framebuffer device
    pub fn open_framebuffer(path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let device = FbDevice::open(path)?;
        let display = Self::open(Box::new(device));
        info!(
            "display {}x{} at {:?}",
            display.surface.width(),
            display.surface.height(),
            display.depth
        );
        Ok(display)
    }

    pub fn context(&self) -> DisplayContext {
        self.surface.context()
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// Access the working surface
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Access mutable working surface
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Fill the working surface with opaque black
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Convert and copy the working surface to the target
    pub fn present(&mut self) {
        if let Some(target) = self.target.as_deref_mut() {
            device::present(&self.surface, target);
        }
    }

    /// Release the target; later presents are no-ops
    pub fn close(&mut self) {
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::argb;
    use crate::device::MemoryTarget;

    #[test]
    fn display_surface_matches_target() {
        let display = Display::new(Box::new(MemoryTarget::new(320, 240, PixelDepth::Bpp16)));
        assert_eq!(display.context(), DisplayContext::new(320, 240));
        assert_eq!(display.depth(), PixelDepth::Bpp16);
        assert!(display.is_open());
    }

    #[test]
    fn display_close_is_idempotent() {
        let mut display = Display::new(Box::new(MemoryTarget::new(4, 4, PixelDepth::Bpp32)));
        display.surface_mut().put_pixel(0, 0, argb(1, 1, 1));
        display.close();
        display.close();
        display.present();
        assert!(!display.is_open());
    }

    #[test]
    fn display_open_starts_black() {
        let display = Display::open(Box::new(MemoryTarget::new(8, 8, PixelDepth::Bpp32)));
        assert!(display.surface().pixels().iter().all(|&p| p == 0xff00_0000));
    }
}
