//! Physical pixel targets and the present step that converts the working
//! surface into their native depth.

pub mod fbdev;
pub mod memory;

pub use fbdev::FbDevice;
pub use memory::MemoryTarget;

use crate::core::color;
use crate::core::surface::Surface;
use crate::error::KioskError;

/// Native pixel depth of a present target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDepth {
    /// RGB565, red in the high bits
    Bpp16,
    /// Same layout as the working surface
    Bpp32,
}

impl PixelDepth {
    pub fn from_bits(bits: u32) -> Result<Self, KioskError> {
        match bits {
            16 => Ok(Self::Bpp16),
            32 => Ok(Self::Bpp32),
            _ => Err(KioskError::UnsupportedDepth { bits }),
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bpp16 => 2,
            Self::Bpp32 => 4,
        }
    }
}

/// Geometry reported by a present target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub width: u32,
    pub height: u32,
    pub depth: PixelDepth,
    /// Bytes per scanline; may include padding past `width * bpp`
    pub stride: usize,
}

impl TargetInfo {
    /// Packed row length in bytes
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.depth.bytes_per_pixel()
    }

    /// Stride actually used for addressing rows
    pub fn effective_stride(&self) -> usize {
        self.stride.max(self.row_bytes())
    }
}

/// Something the working surface can be presented to
pub trait PresentTarget {
    /// Geometry and depth of the target
    fn info(&self) -> TargetInfo;

    /// Writable view of the whole target memory
    fn memory(&mut self) -> &mut [u8];
}

/// Copy the surface into the target, converting depth as needed.
///
/// Rows are addressed with the target's stride; rows or pixels that would
/// land past the end of target memory are skipped.
pub fn present(surface: &Surface, target: &mut dyn PresentTarget) {
    let info = target.info();
    let stride = info.effective_stride();
    let width = surface.width().min(info.width) as usize;
    let height = surface.height().min(info.height) as usize;
    let src_stride = surface.width() as usize;
    let pixels = surface.pixels();
    let memory = target.memory();

    for y in 0..height {
        let src_row = &pixels[y * src_stride..y * src_stride + width];
        let start = y * stride;
        let end = start + width * info.depth.bytes_per_pixel();
        let Some(dst_row) = memory.get_mut(start..end) else {
            break;
        };

        match info.depth {
            PixelDepth::Bpp32 => dst_row.copy_from_slice(bytemuck::cast_slice(src_row)),
            PixelDepth::Bpp16 => {
                for (dst, &pixel) in dst_row.chunks_exact_mut(2).zip(src_row) {
                    dst.copy_from_slice(&color::argb_to_rgb565(pixel).to_le_bytes());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::argb;

    #[test]
    fn test_depth_from_bits() {
        assert_eq!(PixelDepth::from_bits(16).unwrap(), PixelDepth::Bpp16);
        assert_eq!(PixelDepth::from_bits(32).unwrap(), PixelDepth::Bpp32);
        assert!(matches!(
            PixelDepth::from_bits(24),
            Err(KioskError::UnsupportedDepth { bits: 24 })
        ));
    }

    #[test]
    fn test_present_32bpp_is_a_copy() {
        let mut surface = Surface::new(3, 2);
        surface.put_pixel(2, 1, argb(10, 20, 30));
        let mut target = MemoryTarget::new(3, 2, PixelDepth::Bpp32);

        present(&surface, &mut target);
        assert_eq!(target.bytes(), surface.as_bytes());
    }

    #[test]
    fn test_present_16bpp_converts() {
        let mut surface = Surface::new(2, 1);
        surface.put_pixel(0, 0, argb(255, 0, 0));
        surface.put_pixel(1, 0, argb(0, 0, 255));
        let mut target = MemoryTarget::new(2, 1, PixelDepth::Bpp16);

        present(&surface, &mut target);
        assert_eq!(target.bytes(), &[0x00, 0xf8, 0x1f, 0x00]);
    }

    #[test]
    fn test_present_honours_padded_stride() {
        let mut surface = Surface::new(2, 2);
        surface.fill(argb(255, 255, 255));
        let mut target = MemoryTarget::with_stride(2, 2, PixelDepth::Bpp16, 8);

        present(&surface, &mut target);
        let bytes = target.bytes();
        assert_eq!(&bytes[0..4], &[0xff; 4]);
        assert_eq!(&bytes[4..8], &[0; 4]); // padding untouched
        assert_eq!(&bytes[8..12], &[0xff; 4]);
    }

    #[test]
    fn test_present_never_writes_past_target() {
        let surface = Surface::new(4, 4);
        let mut target = MemoryTarget::truncated(4, 4, PixelDepth::Bpp32, 20);

        present(&surface, &mut target);
        assert_eq!(target.bytes().len(), 20);
        assert_eq!(&target.bytes()[0..16], &surface.as_bytes()[0..16]);
    }
}
