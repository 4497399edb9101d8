//! Key sources: terminal, headless, GPIO buttons.

#[cfg(feature = "gpio")]
pub mod gpio;
pub mod headless;
pub mod terminal;

#[cfg(feature = "gpio")]
pub use gpio::GpioButtons;
pub use headless::Headless;
pub use terminal::{RawMode, Terminal};

use crate::core::Controller;

/// Polls several sources in order; the first with a key wins
#[derive(Default)]
pub struct InputChain {
    sources: Vec<Box<dyn Controller>>,
}

impl InputChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: Box<dyn Controller>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Controller for InputChain {
    fn poll(&mut self) -> Option<u8> {
        self.sources.iter_mut().find_map(|source| source.poll())
    }

    fn indicate(&mut self, attracting: bool, now_ms: f64) {
        for source in &mut self.sources {
            source.indicate(attracting, now_ms);
        }
    }
}

/// Input for a run: headless never reads; otherwise GPIO buttons (when
/// built with the `gpio` feature and a chip is available) ahead of the
/// keyboard
pub fn for_run(headless: bool) -> InputChain {
    if headless {
        return InputChain::new().with(Box::new(Headless));
    }

    #[allow(unused_mut)]
    let mut chain = InputChain::new();
    #[cfg(feature = "gpio")]
    {
        match GpioButtons::open("/dev/gpiochip0") {
            Ok(buttons) => chain = chain.with(Box::new(buttons)),
            Err(e) => log::warn!("{e}; keyboard only"),
        }
    }
    chain.with(Box::new(Terminal::stdin()))
}
