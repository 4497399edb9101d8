use std::path::PathBuf;

/// All errors produced by the kiosk.
///
/// Variants split into two groups:
/// - **Startup errors** (fatal): the display device and the page configuration
/// - **Runtime errors** (logged, the main loop keeps going): page content,
///   media playback, image decoding, fonts and GPIO
#[derive(thiserror::Error, Debug)]
pub enum KioskError {
    // ── Startup errors ───────────────────────────────────────────────

    #[error("display device {path}: {reason}")]
    Device { path: PathBuf, reason: String },

    #[error("unsupported display depth: {bits} bits per pixel (need 16 or 32)")]
    UnsupportedDepth { bits: u32 },

    #[error("page config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    // ── Runtime errors ───────────────────────────────────────────────

    #[error("page {path}: {source}")]
    Content {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("media: {0}")]
    Media(#[from] MediaError),

    #[error("image {path}: {reason}")]
    ImageDecode { path: PathBuf, reason: String },

    #[error("font {path}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("GPIO {chip}: {reason}")]
    Gpio { chip: PathBuf, reason: String },
}

impl KioskError {
    /// Whether this error must stop the kiosk before the main loop starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Device { .. } | Self::UnsupportedDepth { .. } | Self::Config { .. }
        )
    }
}

/// Reasons a page configuration file is rejected
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("cannot read file: {0}")]
    Unreadable(String),

    #[error("line {line}: no '=' in {text:?}")]
    MissingEquals { line: usize, text: String },

    #[error("line {line}: empty name in {text:?}")]
    EmptyName { line: usize, text: String },

    #[error("line {line}: empty value in {text:?}")]
    EmptyValue { line: usize, text: String },

    #[error("line {line}: malformed colour {value:?}")]
    MalformedColour { line: usize, value: String },

    #[error("line {line}: malformed number {value:?}")]
    MalformedNumber { line: usize, value: String },

    #[error("line {line}: unknown {kind} option {name:?}")]
    UnknownKey {
        line: usize,
        kind: &'static str,
        name: String,
    },
}

/// Failures while bringing up a video stream
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("engine initialisation failed: {0}")]
    Instance(String),

    #[error("cannot open media {path}: {reason}")]
    Media { path: PathBuf, reason: String },

    #[error("player creation failed: {0}")]
    Player(String),
}
