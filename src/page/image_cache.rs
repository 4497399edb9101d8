use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, warn};

use crate::error::KioskError;

const PLACEHOLDER_WIDTH: u32 = 64;
const PLACEHOLDER_HEIGHT: u32 = 48;

struct Cached {
    path: String,
    image: RgbaImage,
    /// Last resized band and the (width, height, rows) it was made for
    scaled: Option<(RgbaImage, (u32, u32, u32))>,
}

/// Holds the most recently used page image.
///
/// Only one decoded image is kept; asking for a different path replaces it.
/// Images that fail to decode are replaced by a fixed placeholder.
pub struct ImageCache {
    root: PathBuf,
    current: Option<Cached>,
    loads: usize,
}

impl ImageCache {
    /// Relative image paths resolve against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: None,
            loads: 0,
        }
    }

    /// Natural size of the image at `path`
    pub fn dimensions(&mut self, path: &str) -> (u32, u32) {
        self.entry(path).image.dimensions()
    }

    /// The image resized to `width` x `height`, keeping only the top
    /// `rows` rows of the result
    pub fn scaled(&mut self, path: &str, width: u32, height: u32, rows: u32) -> &RgbaImage {
        let key = (width, height, rows.min(height));
        let entry = self.entry(path);
        if entry.scaled.as_ref().map_or(true, |(_, made_for)| *made_for != key) {
            let band = scale_band(&entry.image, key.0, key.1, key.2);
            entry.scaled = Some((band, key));
        }
        &entry.scaled.get_or_insert_with(|| (RgbaImage::default(), key)).0
    }

    /// Number of decode attempts so far
    pub fn loads(&self) -> usize {
        self.loads
    }

    fn entry(&mut self, path: &str) -> &mut Cached {
        let hit = self.current.as_ref().is_some_and(|c| c.path == path);
        if !hit {
            self.loads += 1;
            let image = match self.decode(path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("{e}; showing placeholder");
                    placeholder()
                }
            };
            self.current = Some(Cached {
                path: path.to_string(),
                image,
                scaled: None,
            });
        }
        self.current.get_or_insert_with(|| Cached {
            path: path.to_string(),
            image: placeholder(),
            scaled: None,
        })
    }

    fn decode(&self, path: &str) -> Result<RgbaImage, KioskError> {
        let full = self.resolve(path);
        let image = image::open(&full).map_err(|e| KioskError::ImageDecode {
            path: full.clone(),
            reason: e.to_string(),
        })?;
        debug!("decoded {} ({}x{})", full.display(), image.width(), image.height());
        Ok(image.to_rgba8())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Resize `image` to `width` x `height` and keep the top `rows` rows.
///
/// Only the source rows that land in the band are filtered, so a tall image
/// costs no more than the part of it that fits on screen.
fn scale_band(image: &RgbaImage, width: u32, height: u32, rows: u32) -> RgbaImage {
    let (src_w, src_h) = image.dimensions();
    if rows == 0 || src_w == 0 || src_h == 0 {
        return RgbaImage::new(width, rows);
    }
    if rows == height {
        return imageops::resize(image, width, height, FilterType::Triangle);
    }

    let src_rows = (rows as u64 * src_h as u64)
        .div_ceil(height as u64)
        .clamp(1, src_h as u64) as u32;
    let band_height = ((src_rows as u64 * height as u64) / src_h as u64).max(rows as u64) as u32;
    let source = imageops::crop_imm(image, 0, 0, src_w, src_rows).to_image();
    let band = imageops::resize(&source, width, band_height, FilterType::Triangle);
    imageops::crop_imm(&band, 0, 0, width, rows).to_image()
}

/// Dark panel with a diagonal cross
pub fn placeholder() -> RgbaImage {
    let (w, h) = (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    RgbaImage::from_fn(w, h, |x, y| {
        let on_diagonal = x * h / w == y || (w - 1 - x) * h / w == y;
        if on_diagonal {
            Rgba([0x80, 0x80, 0x80, 0xff])
        } else {
            Rgba([0x20, 0x20, 0x20, 0xff])
        }
    })
}
