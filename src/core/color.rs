//! Packed pixel conversions between the 32-bit working format and the
//! 16-bit formats used by displays and the video decoder.
//!
//! Working pixels are `0xAARRGGBB` words; in memory (little endian) that is
//! the byte order B, G, R, A.

/// Opaque black in the working format
pub const OPAQUE_BLACK: u32 = 0xff00_0000;

const MASK_HI5: u16 = 0b1111_1000_0000_0000;
const MASK_MID6: u16 = 0b0000_0111_1110_0000;
const MASK_LO5: u16 = 0b0000_0000_0001_1111;

/// Build an opaque working pixel from 8-bit channels
pub const fn argb(r: u8, g: u8, b: u8) -> u32 {
    0xff00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Build an opaque working pixel from unit-range float channels
pub fn argb_from_unit(r: f32, g: f32, b: f32) -> u32 {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    argb(to_byte(r), to_byte(g), to_byte(b))
}

/// Split a working pixel into (r, g, b)
pub const fn channels(pixel: u32) -> (u8, u8, u8) {
    ((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
}

/// Truncate a working pixel to RGB565 (red in the high bits)
pub const fn argb_to_rgb565(pixel: u32) -> u16 {
    let (r, g, b) = channels(pixel);
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Expand an RGB565 pixel back to the working format
pub const fn rgb565_to_argb(pixel: u16) -> u32 {
    let r = ((pixel & MASK_HI5) >> 11) as u8;
    let g = ((pixel & MASK_MID6) >> 5) as u8;
    let b = (pixel & MASK_LO5) as u8;
    argb(r << 3, g << 2, b << 3)
}

/// Expand a decoder pixel whose high five bits carry blue
pub const fn bgr565_to_argb(pixel: u16) -> u32 {
    let b = ((pixel & MASK_HI5) >> 11) as u8;
    let g = ((pixel & MASK_MID6) >> 5) as u8;
    let r = (pixel & MASK_LO5) as u8;
    argb(r << 3, g << 2, b << 3)
}

/// Linear blend of `fg` over `bg` with 8-bit coverage
pub fn blend(fg: u32, bg: u32, coverage: u8) -> u32 {
    let a = coverage as u32;
    let (fr, fg_, fb) = channels(fg);
    let (br, bg_, bb) = channels(bg);
    let mix = |f: u8, b: u8| ((f as u32 * a + b as u32 * (255 - a)) / 255) as u8;
    argb(mix(fr, br), mix(fg_, bg_), mix(fb, bb))
}
