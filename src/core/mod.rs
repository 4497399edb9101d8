pub mod clock;
pub mod color;
pub mod controller;
pub mod display_context;
pub mod draw;
pub mod surface;
pub mod timer;

pub use clock::Clock;
pub use controller::{Controller, Key};
pub use display_context::DisplayContext;
pub use surface::Surface;
pub use timer::{Debouncer, FramePacer, IdleTimer};
