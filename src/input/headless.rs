use crate::core::Controller;

/// Input for unattended runs: the terminal is left alone and no key ever
/// arrives
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Controller for Headless {
    fn poll(&mut self) -> Option<u8> {
        None
    }
}
