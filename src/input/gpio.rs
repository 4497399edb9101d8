//! Push buttons and indicator LEDs on a Raspberry Pi header.
//!
//! Buttons are pulled up and read low when pressed. LEDs are wired active
//! low: writing 0 lights them.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use log::{info, warn};

use crate::core::controller::{Key, BUTTON_COUNT};
use crate::core::Controller;
use crate::error::KioskError;

pub const BUTTON_PINS: [u32; BUTTON_COUNT] = [14, 18, 24, 8, 3, 17, 22, 9];
pub const LED_PINS: [u32; BUTTON_COUNT] = [15, 23, 25, 7, 4, 27, 10, 11];

const CONSUMER: &str = "page-kiosk";
const BLINK: Duration = Duration::from_millis(100);
/// Attract-mode LED chase step
const CHASE_STEP_MS: f64 = 200.0;

const LED_ON: u8 = 0;
const LED_OFF: u8 = 1;

/// LED of each side lit during attract mode at `now_ms`
pub fn chase_position(now_ms: f64) -> usize {
    (now_ms / CHASE_STEP_MS) as usize % 4
}

struct Channel {
    button: LineHandle,
    led: LineHandle,
    /// Buttons not reading high at start-up are treated as absent
    present: bool,
}

pub struct GpioButtons {
    chip: PathBuf,
    channels: Vec<Channel>,
    attracting: bool,
    now_ms: f64,
}

impl GpioButtons {
    pub fn open(chip_path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let chip_path = chip_path.as_ref().to_path_buf();
        let gpio_error = |e: gpio_cdev::Error| KioskError::Gpio {
            chip: chip_path.clone(),
            reason: e.to_string(),
        };

        let mut chip = Chip::new(&chip_path).map_err(gpio_error)?;
        let mut channels = Vec::with_capacity(BUTTON_COUNT);
        for (n, (&button_pin, &led_pin)) in BUTTON_PINS.iter().zip(&LED_PINS).enumerate() {
            let button = chip
                .get_line(button_pin)
                .and_then(|line| line.request(LineRequestFlags::INPUT, 0, CONSUMER))
                .map_err(gpio_error)?;
            let led = chip
                .get_line(led_pin)
                .and_then(|line| line.request(LineRequestFlags::OUTPUT, LED_OFF, CONSUMER))
                .map_err(gpio_error)?;

            let level = button.get_value().map_err(gpio_error)?;
            info!("GPIO button {n} (pin {button_pin}) reads {level}");
            channels.push(Channel {
                button,
                led,
                present: level == 1,
            });
        }

        let mut buttons = Self {
            chip: chip_path,
            channels,
            attracting: false,
            now_ms: 0.0,
        };
        buttons.blink_all();
        Ok(buttons)
    }

    /// Flash each LED twice in turn
    fn blink_all(&mut self) {
        for channel in &self.channels {
            for _ in 0..2 {
                channel.led.set_value(LED_ON).ok();
                thread::sleep(BLINK);
                channel.led.set_value(LED_OFF).ok();
                thread::sleep(BLINK);
            }
        }
    }
}

impl Controller for GpioButtons {
    fn poll(&mut self) -> Option<u8> {
        let lit = self.attracting.then(|| chase_position(self.now_ms));

        for (n, channel) in self.channels.iter().enumerate() {
            if !channel.present {
                continue;
            }
            let pressed = match channel.button.get_value() {
                Ok(level) => level == 0,
                Err(e) => {
                    warn!("GPIO {} button {n}: {e}", self.chip.display());
                    false
                }
            };
            let on = pressed || lit == Some(n % 4);
            channel.led.set_value(if on { LED_ON } else { LED_OFF }).ok();
            if pressed {
                return Some(Key::button_code(n));
            }
        }
        None
    }

    fn indicate(&mut self, attracting: bool, now_ms: f64) {
        self.attracting = attracting;
        self.now_ms = now_ms;
    }
}

impl Drop for GpioButtons {
    fn drop(&mut self) {
        for channel in &self.channels {
            channel.led.set_value(LED_OFF).ok();
        }
    }
}
