//! Video overlay.
//!
//! A media engine decodes on its own thread and talks to the kiosk only
//! through a [`FrameSink`]: it fills a staging buffer, publishes it to the
//! ready buffer and posts events on a channel. The main loop drains those
//! events once per frame and does all drawing and teardown itself.

pub mod ffmpeg;

pub use ffmpeg::FfmpegEngine;

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info};

use crate::core::Surface;
use crate::error::MediaError;

/// Decoded frame geometry, 16-bit pixels with blue in the high bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
}

impl FrameFormat {
    pub const DEFAULT: FrameFormat = FrameFormat {
        width: 320,
        height: 240,
    };

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes per row of the raw stream
    pub fn stride(&self) -> usize {
        self.width as usize * 2
    }
}

/// Posted by the engine thread, tagged with the stream it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    Frame { session: u64 },
    Stopped { session: u64 },
}

/// What happened since the last [`VideoBridge::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoUpdate {
    pub frames: usize,
    pub stopped: bool,
}

struct FrameBuffers {
    staging: Mutex<Vec<u16>>,
    ready: Mutex<Vec<u16>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Engine-side handle for one stream
#[derive(Clone)]
pub struct FrameSink {
    session: u64,
    format: FrameFormat,
    buffers: Arc<FrameBuffers>,
    events: Sender<VideoEvent>,
}

impl FrameSink {
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Staging buffer for the next frame
    pub fn lock(&self) -> MutexGuard<'_, Vec<u16>> {
        locked(&self.buffers.staging)
    }

    /// Publish the staging buffer as the ready frame
    pub fn unlock(&self) {
        let staging = locked(&self.buffers.staging);
        locked(&self.buffers.ready).copy_from_slice(&staging);
    }

    /// Ask the main loop to show the ready frame
    pub fn display(&self) {
        self.events.send(VideoEvent::Frame { session: self.session }).ok();
    }

    /// Report that the stream has ended
    pub fn stopped(&self) {
        self.events.send(VideoEvent::Stopped { session: self.session }).ok();
    }
}

/// A running stream
pub trait MediaPlayer {
    /// Stop decoding and release the stream; no sink calls happen after
    /// this returns
    fn stop(&mut self);
}

/// Something that can decode video files into a [`FrameSink`]
pub trait MediaEngine {
    /// Bring the engine up; called before the first stream after a release
    fn create_instance(&mut self) -> Result<(), MediaError>;

    /// Open `path` and start playing it into `sink`
    fn play(&mut self, path: &Path, sink: FrameSink) -> Result<Box<dyn MediaPlayer>, MediaError>;

    /// Tear the engine down
    fn release(&mut self);
}

/// Where the video overlay goes on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub top: i32,
    /// Surfaces at least this tall show the video at 2x
    pub scale_min_height: u32,
}

/// Owns the engine and the frame buffers for the current stream
pub struct VideoBridge {
    engine: Box<dyn MediaEngine>,
    instance: bool,
    player: Option<Box<dyn MediaPlayer>>,
    buffers: Option<Arc<FrameBuffers>>,
    format: FrameFormat,
    placement: Placement,
    session: u64,
    sender: Sender<VideoEvent>,
    receiver: Receiver<VideoEvent>,
}

impl VideoBridge {
    pub fn new(engine: Box<dyn MediaEngine>, placement: Placement) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            engine,
            instance: false,
            player: None,
            buffers: None,
            format: FrameFormat::DEFAULT,
            placement,
            session: 0,
            sender,
            receiver,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_some()
    }

    /// Stop anything playing, then start `path`.
    ///
    /// Failures are logged and leave the bridge stopped.
    pub fn play(&mut self, path: &Path) -> bool {
        self.stop();
        match self.try_play(path) {
            Ok(()) => {
                info!("playing {} (session {})", path.display(), self.session);
                true
            }
            Err(e) => {
                error!("video {}: {}", path.display(), e);
                self.stop();
                false
            }
        }
    }

    fn try_play(&mut self, path: &Path) -> Result<(), MediaError> {
        if !self.instance {
            self.engine.create_instance()?;
            self.instance = true;
        }

        let pixels = self.format.pixel_count();
        let buffers = Arc::new(FrameBuffers {
            staging: Mutex::new(vec![0; pixels]),
            ready: Mutex::new(vec![0; pixels]),
        });
        self.session += 1;
        let sink = FrameSink {
            session: self.session,
            format: self.format,
            buffers: Arc::clone(&buffers),
            events: self.sender.clone(),
        };

        self.buffers = Some(buffers);
        self.player = Some(self.engine.play(path, sink)?);
        Ok(())
    }

    /// Release player, engine instance and buffers. Safe to repeat.
    pub fn stop(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.stop();
            debug!("video session {} stopped", self.session);
        }
        if self.instance {
            self.engine.release();
            self.instance = false;
        }
        self.buffers = None;
    }

    /// Drain pending events for the current stream; older ones are dropped
    pub fn poll(&mut self) -> VideoUpdate {
        let mut update = VideoUpdate::default();
        let current = self.is_playing().then_some(self.session);

        for event in self.receiver.try_iter() {
            match event {
                VideoEvent::Frame { session } if Some(session) == current => update.frames += 1,
                VideoEvent::Stopped { session } if Some(session) == current => update.stopped = true,
                stale => debug!("ignoring {stale:?}"),
            }
        }
        update
    }

    /// 2x when the surface is tall enough, else 1:1
    pub fn scale_for(&self, surface_height: u32) -> u32 {
        if surface_height >= self.placement.scale_min_height {
            2
        } else {
            1
        }
    }

    /// Draw the ready frame centred horizontally at the configured top
    pub fn blit(&self, surface: &mut Surface) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        let ready = locked(&buffers.ready);
        let FrameFormat { width, height } = self.format;
        let scale = self.scale_for(surface.height());
        let x = (surface.width() as i32 - (width * scale) as i32) / 2;
        let y = self.placement.top;

        if scale == 2 {
            surface.blit_bgr565_scaled2x(&ready, width, height, x, y);
        } else {
            surface.blit_bgr565(&ready, width, height, x, y);
        }
    }
}

impl Drop for VideoBridge {
    fn drop(&mut self) {
        self.stop();
    }
}
