use super::{PixelDepth, PresentTarget, TargetInfo};

/// Present target backed by ordinary memory
///
/// Used for tests, benchmarks and for running the page engine without a
/// display device.
pub struct MemoryTarget {
    info: TargetInfo,
    memory: Vec<u8>,
}

impl MemoryTarget {
    /// Tightly packed target
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Self {
        Self::with_stride(width, height, depth, width as usize * depth.bytes_per_pixel())
    }

    /// Target whose rows are `stride` bytes apart
    pub fn with_stride(width: u32, height: u32, depth: PixelDepth, stride: usize) -> Self {
        let info = TargetInfo {
            width,
            height,
            depth,
            stride,
        };
        let len = info.effective_stride() * height as usize;
        Self {
            info,
            memory: vec![0; len],
        }
    }

    /// Target with less memory than its geometry claims
    pub fn truncated(width: u32, height: u32, depth: PixelDepth, len: usize) -> Self {
        let mut target = Self::new(width, height, depth);
        target.memory.truncate(len);
        target
    }

    pub fn bytes(&self) -> &[u8] {
        &self.memory
    }
}

impl PresentTarget for MemoryTarget {
    fn info(&self) -> TargetInfo {
        self.info
    }

    fn memory(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}
