use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{PixelDepth, PresentTarget, TargetInfo};
use crate::error::KioskError;

const FBIOGET_VSCREENINFO: u64 = 0x4600;
const FBIOGET_FSCREENINFO: u64 = 0x4602;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// `struct fb_var_screeninfo` from linux/fb.h
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbVarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// `struct fb_fix_screeninfo` from linux/fb.h
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbFixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// Linux framebuffer device mapped into memory
///
/// The mapping is released and the device closed on drop.
pub struct FbDevice {
    path: PathBuf,
    // Keeps the descriptor open for the lifetime of the mapping
    _file: File,
    map: *mut u8,
    map_len: usize,
    info: TargetInfo,
}

impl FbDevice {
    /// Open the device, query its geometry and map its memory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let path = path.as_ref().to_path_buf();
        let device_error = |reason: String| KioskError::Device {
            path: path.clone(),
            reason,
        };

        let file = File::options()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| device_error(format!("cannot open: {e}")))?;
        info!("framebuffer device {} opened", path.display());

        let fd = file.as_raw_fd();
        let mut fix = FbFixScreenInfo::default();
        // SAFETY: fd is open and `fix` matches the kernel layout for this request.
        if unsafe { libc::ioctl(fd, FBIOGET_FSCREENINFO as _, &mut fix as *mut FbFixScreenInfo) } != 0 {
            return Err(device_error(format!(
                "reading fixed screen info: {}",
                std::io::Error::last_os_error()
            )));
        }

        let mut var = FbVarScreenInfo::default();
        // SAFETY: fd is open and `var` matches the kernel layout for this request.
        if unsafe { libc::ioctl(fd, FBIOGET_VSCREENINFO as _, &mut var as *mut FbVarScreenInfo) } != 0 {
            return Err(device_error(format!(
                "reading variable screen info: {}",
                std::io::Error::last_os_error()
            )));
        }

        let depth = PixelDepth::from_bits(var.bits_per_pixel)?;
        let info = TargetInfo {
            width: var.xres,
            height: var.yres,
            depth,
            stride: fix.line_length as usize,
        };
        debug!("framebuffer geometry {:?}, {} bytes mapped", info, fix.smem_len);

        let map_len = fix.smem_len as usize;
        // SAFETY: mapping a device file we hold open; the result is checked
        // against MAP_FAILED before use.
        let map = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if map == libc::MAP_FAILED {
            return Err(device_error(format!(
                "mmap failed: {}",
                std::io::Error::last_os_error()
            )));
        }

        Ok(Self {
            path,
            _file: file,
            map: map as *mut u8,
            map_len,
            info,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresentTarget for FbDevice {
    fn info(&self) -> TargetInfo {
        self.info
    }

    fn memory(&mut self) -> &mut [u8] {
        // SAFETY: `map` is a live shared mapping of `map_len` bytes owned by
        // self, and the exclusive borrow prevents aliasing from this side.
        unsafe { std::slice::from_raw_parts_mut(self.map, self.map_len) }
    }
}

impl Drop for FbDevice {
    fn drop(&mut self) {
        // SAFETY: unmapping exactly the region returned by mmap in `open`.
        unsafe {
            libc::munmap(self.map as *mut libc::c_void, self.map_len);
        }
        debug!("framebuffer device {} closed", self.path.display());
    }
}
