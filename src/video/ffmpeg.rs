use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use super::{FrameFormat, FrameSink, MediaEngine, MediaPlayer};
use crate::error::MediaError;

/// Decodes through an `ffmpeg` child process writing raw frames to a pipe
pub struct FfmpegEngine {
    program: PathBuf,
}

impl FfmpegEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn arguments(path: &Path, format: FrameFormat) -> Vec<String> {
        vec![
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
            "-re".into(),
            "-i".into(),
            path.display().to_string(),
            "-an".into(),
            "-vf".into(),
            format!("scale={}:{}", format.width, format.height),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "bgr565le".into(),
            "-".into(),
        ]
    }
}

impl MediaEngine for FfmpegEngine {
    fn create_instance(&mut self) -> Result<(), MediaError> {
        let status = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| MediaError::Instance(format!("{}: {e}", self.program.display())))?;
        if !status.success() {
            return Err(MediaError::Instance(format!(
                "{} -version exited with {status}",
                self.program.display()
            )));
        }
        Ok(())
    }

    fn play(&mut self, path: &Path, sink: FrameSink) -> Result<Box<dyn MediaPlayer>, MediaError> {
        if !path.is_file() {
            return Err(MediaError::Media {
                path: path.to_path_buf(),
                reason: "no such file".into(),
            });
        }

        let mut child = Command::new(&self.program)
            .args(Self::arguments(path, sink.format()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| MediaError::Player(e.to_string()))?;

        let Some(stdout) = child.stdout.take() else {
            child.kill().ok();
            child.wait().ok();
            return Err(MediaError::Player("decoder has no output pipe".into()));
        };
        debug!("ffmpeg pid {} decoding {}", child.id(), path.display());

        let reader = thread::Builder::new()
            .name("video-reader".into())
            .spawn(move || pump_frames(stdout, sink))
            .map_err(|e| MediaError::Player(e.to_string()));
        match reader {
            Ok(reader) => Ok(Box::new(FfmpegPlayer {
                child,
                reader: Some(reader),
            })),
            Err(e) => {
                child.kill().ok();
                child.wait().ok();
                Err(e)
            }
        }
    }

    fn release(&mut self) {}
}

/// Copy whole frames from the decoder into the sink until the pipe closes
fn pump_frames(mut stdout: ChildStdout, sink: FrameSink) {
    let format = sink.format();
    let mut raw = vec![0u8; format.stride() * format.height as usize];

    loop {
        match stdout.read_exact(&mut raw) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                warn!("video pipe: {e}");
                break;
            }
        }

        {
            let mut staging = sink.lock();
            for (dst, src) in staging.iter_mut().zip(raw.chunks_exact(2)) {
                *dst = u16::from_le_bytes([src[0], src[1]]);
            }
        }
        sink.unlock();
        sink.display();
    }
    sink.stopped();
}

struct FfmpegPlayer {
    child: Child,
    reader: Option<JoinHandle<()>>,
}

impl MediaPlayer for FfmpegPlayer {
    fn stop(&mut self) {
        if let Err(e) = self.child.kill() {
            // already exited
            debug!("ffmpeg kill: {e}");
        }
        self.child.wait().ok();
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("video reader thread panicked");
            }
        }
    }
}

impl Drop for FfmpegPlayer {
    fn drop(&mut self) {
        if self.reader.is_some() {
            self.stop();
        }
    }
}
