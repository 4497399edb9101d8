pub mod cli;
pub mod config;
pub mod core;
pub mod device;
pub mod display;
pub mod error;
pub mod input;
pub mod kiosk;
pub mod page;
pub mod video;

pub use config::PageConfig;
pub use display::Display;
pub use error::{ConfigError, KioskError, MediaError};
pub use kiosk::{Kiosk, Mode};
