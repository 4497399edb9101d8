//! The kiosk state machine and its screen saver.

pub mod app;
pub mod attract;

pub use app::{draw_splash_step, Kiosk, Mode, SPLASH_COLOURS};
pub use attract::{Attract, Sprite};
