//! Page configuration - sizes, colours and timings loaded once at start-up
//! from `page-config-{W}x{H}.txt` in the content root.
//!
//! The file is a list of `Name=value` lines where the value is a number,
//! a colour `[r,g,b]` with unit-range components, or a quoted string.

use std::path::Path;

use log::{debug, error, trace};
use serde::Serialize;

use crate::core::color::argb_from_unit;
use crate::core::DisplayContext;
use crate::error::{ConfigError, KioskError};

/// RGB colour with unit-range components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Opaque working-surface pixel
    pub fn to_argb(self) -> u32 {
        argb_from_unit(self.r, self.g, self.b)
    }
}

/// Rendering configuration for pages, buttons, video and attract mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageConfig {
    pub font_size_normal: f32,
    pub font_size_heading: f32,
    pub char_height: f32,
    pub char_width: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub button_height: f32,
    pub button_border: f32,
    /// Characters revealed per frame
    pub scroll_speed: f32,
    pub video_pos_y: f32,
    /// Seconds without activity before attract mode
    pub idle_timeout: f32,
    /// Smallest surface height at which video is shown at 2x
    pub video_scale_min_height: f32,
    pub attract_sprite_count: f32,
    /// Attract sprite speed in pixels per second
    pub attract_speed: f32,
    pub text_colour: Rgb,
    pub text_background_colour: Rgb,
    pub image_border_colour: Rgb,
    pub button_colour: Rgb,
    pub font_path: Option<String>,
    pub font_bold_path: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            font_size_normal: 14.0,
            font_size_heading: 18.0,
            char_height: 18.0,
            char_width: 5.0,
            margin_x: 100.0,
            margin_y: 20.0,
            button_height: 18.0 + 3.0,
            button_border: 3.0,
            scroll_speed: 5.0,
            video_pos_y: 40.0,
            idle_timeout: 120.0,
            video_scale_min_height: 480.0,
            attract_sprite_count: 4.0,
            attract_speed: 120.0,
            text_colour: Rgb::new(0.0, 1.0, 0.0),
            text_background_colour: Rgb::new(0.0, 0.0, 0.0),
            image_border_colour: Rgb::new(0.0, 0.4, 0.0),
            button_colour: Rgb::new(0.0, 1.0, 1.0),
            font_path: None,
            font_bold_path: None,
        }
    }
}

/// Accessor for one named option
#[derive(Clone, Copy)]
pub enum Field {
    Number(fn(&mut PageConfig) -> &mut f32),
    Colour(fn(&mut PageConfig) -> &mut Rgb),
    Text(fn(&mut PageConfig) -> &mut Option<String>),
}

impl Field {
    pub fn kind(&self) -> &'static str {
        match self {
            Field::Number(_) => "number",
            Field::Colour(_) => "colour",
            Field::Text(_) => "string",
        }
    }
}

/// Every option name in file order, with its accessor
pub const KEYS: &[(&str, Field)] = &[
    ("FontSizeNormal", Field::Number(|c| &mut c.font_size_normal)),
    ("FontSizeHeading", Field::Number(|c| &mut c.font_size_heading)),
    ("CharHeight", Field::Number(|c| &mut c.char_height)),
    ("CharWidth", Field::Number(|c| &mut c.char_width)),
    ("MarginX", Field::Number(|c| &mut c.margin_x)),
    ("MarginY", Field::Number(|c| &mut c.margin_y)),
    ("ButtonHeight", Field::Number(|c| &mut c.button_height)),
    ("ButtonBorder", Field::Number(|c| &mut c.button_border)),
    ("ScrollSpeed", Field::Number(|c| &mut c.scroll_speed)),
    ("VideoPosY", Field::Number(|c| &mut c.video_pos_y)),
    ("IdleTimeout", Field::Number(|c| &mut c.idle_timeout)),
    ("VideoScaleMinHeight", Field::Number(|c| &mut c.video_scale_min_height)),
    ("AttractSpriteCount", Field::Number(|c| &mut c.attract_sprite_count)),
    ("AttractSpeed", Field::Number(|c| &mut c.attract_speed)),
    ("TextColour", Field::Colour(|c| &mut c.text_colour)),
    ("TextBackgroundColour", Field::Colour(|c| &mut c.text_background_colour)),
    ("ImageBorderColour", Field::Colour(|c| &mut c.image_border_colour)),
    ("ButtonColour", Field::Colour(|c| &mut c.button_colour)),
    ("FontPath", Field::Text(|c| &mut c.font_path)),
    ("FontBoldPath", Field::Text(|c| &mut c.font_bold_path)),
];

impl PageConfig {
    /// Name of the config file for a display resolution
    pub fn file_name(ctx: DisplayContext) -> String {
        format!("page-config-{}x{}.txt", ctx.width, ctx.height)
    }

    /// All valid option names
    pub fn keys() -> impl Iterator<Item = &'static str> {
        KEYS.iter().map(|(name, _)| *name)
    }

    fn field(name: &str) -> Option<Field> {
        KEYS.iter().find(|(key, _)| *key == name).map(|(_, field)| *field)
    }

    /// Load defaults overridden by the given file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let path = path.as_ref();
        let wrap = |source| KioskError::Config {
            path: path.to_path_buf(),
            source,
        };

        let text = std::fs::read_to_string(path).map_err(|e| wrap(ConfigError::Unreadable(e.to_string())))?;
        let mut config = Self::default();
        if let Err(e) = config.apply_str(&text) {
            error!("bad page config {}: {}", path.display(), e);
            return Err(wrap(e));
        }

        match serde_json::to_string(&config) {
            Ok(json) => debug!("page config {}: {}", path.display(), json),
            Err(e) => debug!("page config not serialisable: {e}"),
        }
        Ok(config)
    }

    /// Apply every line of a config file in order.
    ///
    /// Stops at the first bad line; options set by earlier lines stay set.
    pub fn apply_str(&mut self, text: &str) -> Result<(), ConfigError> {
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let text = raw.trim_end_matches('\r');
            if text.is_empty() {
                continue;
            }

            let Some((name, value)) = text.split_once('=') else {
                return Err(ConfigError::MissingEquals {
                    line,
                    text: text.to_string(),
                });
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                return Err(ConfigError::EmptyName {
                    line,
                    text: text.to_string(),
                });
            }
            if value.is_empty() {
                return Err(ConfigError::EmptyValue {
                    line,
                    text: text.to_string(),
                });
            }
            trace!("config '{name}' -> '{value}'");
            self.set(line, name, value)?;
        }
        Ok(())
    }

    fn set(&mut self, line: usize, name: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = |kind| ConfigError::UnknownKey {
            line,
            kind,
            name: name.to_string(),
        };

        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let colour = parse_colour(inner).ok_or_else(|| ConfigError::MalformedColour {
                line,
                value: value.to_string(),
            })?;
            return match Self::field(name) {
                Some(Field::Colour(slot)) => {
                    *slot(self) = colour;
                    Ok(())
                }
                _ => Err(unknown("colour")),
            };
        }

        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            return match Self::field(name) {
                Some(Field::Text(slot)) => {
                    *slot(self) = Some(value[1..value.len() - 1].to_string());
                    Ok(())
                }
                _ => Err(unknown("string")),
            };
        }

        let number: f32 = value.parse().map_err(|_| ConfigError::MalformedNumber {
            line,
            value: value.to_string(),
        })?;
        match Self::field(name) {
            Some(Field::Number(slot)) => {
                *slot(self) = number;
                Ok(())
            }
            _ => Err(unknown("number")),
        }
    }
}

fn parse_colour(inner: &str) -> Option<Rgb> {
    let mut parts = inner.split(',').map(|p| p.trim().parse::<f32>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb::new(r, g, b))
}
