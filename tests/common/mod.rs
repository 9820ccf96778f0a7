//! Fixture helpers shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};

pub const OPAQUE: Rgba<u8> = Rgba([200, 180, 40, 255]);

/// Fully opaque image.
pub fn opaque(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, OPAQUE)
}

/// Transparent image with one opaque block at `(left, top)`.
pub fn with_block(width: u32, height: u32, left: u32, top: u32, block_w: u32, block_h: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = (left..left + block_w).contains(&x) && (top..top + block_h).contains(&y);
        if inside { OPAQUE } else { Rgba([0, 0, 0, 0]) }
    })
}

pub fn write_png(path: &Path, image: &RgbaImage) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image.save(path).unwrap();
}

pub fn write_json(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
