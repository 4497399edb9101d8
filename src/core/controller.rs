/// Number of physical side buttons, four per side
pub const BUTTON_COUNT: usize = 8;

/// Meaning of a single key code from any input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Side button, 0..=3 on the left and 4..=7 on the right
    Button(usize),
    Quit,
    /// Anything else; still counts as activity
    Other(u8),
}

impl Key {
    /// Decode an input byte; '1'..'8' select buttons and 'q' quits
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'q' => Key::Quit,
            b'1'..=b'8' => Key::Button((byte - b'1') as usize),
            other => Key::Other(other),
        }
    }

    /// Key code a button reports, matching the keyboard digit
    pub fn button_code(index: usize) -> u8 {
        b'1' + index as u8
    }
}

/// Controller - a non-blocking source of key codes
pub trait Controller {
    /// Next pending key code, if any
    fn poll(&mut self) -> Option<u8>;

    /// Called once per frame so indicator lights can follow the kiosk mode
    fn indicate(&mut self, _attracting: bool, _now_ms: f64) {}
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn poll(&mut self) -> Option<u8> {
        (**self).poll()
    }

    fn indicate(&mut self, attracting: bool, now_ms: f64) {
        (**self).indicate(attracting, now_ms)
    }
}
