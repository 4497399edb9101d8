use std::io;
use std::os::unix::io::RawFd;

use log::{debug, warn};

use crate::core::Controller;

/// Puts a terminal into non-canonical, no-echo mode until dropped
pub struct RawMode {
    fd: RawFd,
    original: libc::termios,
}

impl RawMode {
    pub fn enable(fd: RawFd) -> io::Result<Self> {
        // SAFETY: termios is plain data; tcgetattr fills it or fails.
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = original;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        // SAFETY: `raw` is a valid termios obtained from tcgetattr.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        debug!("raw mode on fd {fd}");
        Ok(Self { fd, original })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // SAFETY: restoring the settings read in `enable`.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) } != 0 {
            warn!("restoring terminal: {}", io::Error::last_os_error());
        }
    }
}

/// Keyboard input read a byte at a time without blocking
pub struct Terminal {
    fd: RawFd,
    _raw: Option<RawMode>,
}

impl Terminal {
    /// Standard input in raw mode; works without raw mode when stdin is
    /// not a terminal
    pub fn stdin() -> Self {
        let fd = libc::STDIN_FILENO;
        let raw = match RawMode::enable(fd) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("stdin is not a terminal ({e}); reading it as-is");
                None
            }
        };
        Self { fd, _raw: raw }
    }

    /// Read from an already configured descriptor
    pub fn from_fd(fd: RawFd) -> Self {
        Self { fd, _raw: None }
    }

    fn bytes_waiting(&self) -> io::Result<usize> {
        let mut waiting: libc::c_int = 0;
        // SAFETY: FIONREAD writes a single int through the pointer.
        if unsafe { libc::ioctl(self.fd, libc::FIONREAD, &mut waiting) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(waiting.max(0) as usize)
    }

    fn read_byte(&self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        // SAFETY: reading at most one byte into a one-byte buffer.
        let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl Controller for Terminal {
    fn poll(&mut self) -> Option<u8> {
        let result = match self.bytes_waiting() {
            Ok(0) => return None,
            Ok(_) => self.read_byte(),
            Err(e) => Err(e),
        };
        match result {
            Ok(byte) => byte,
            Err(e) => {
                warn!("keyboard read: {e}");
                None
            }
        }
    }
}
