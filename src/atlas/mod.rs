//! Texture atlas composition.
//!
//! [`packer`] decides where every texture goes; [`TextureAtlas`] copies the
//! pixels into one square RGBA buffer and keeps the placements for lookups.

pub mod packer;

use std::collections::BTreeMap;
use std::path::Path;

use image::RgbaImage;

use crate::error::{ResourceError, Result};
use crate::geometry::IntRect;

pub use packer::{Packing, PlacedRect, pack};

// ── UvRect ───────────────────────────────────────────────────────────────────

/// Normalised texture coordinates of one placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

// ── TextureAtlas ─────────────────────────────────────────────────────────────

/// The composed atlas: a `side × side` RGBA buffer plus one placement per key.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    image: RgbaImage,
    placements: BTreeMap<String, IntRect>,
    packed_width: u32,
    packed_height: u32,
}

impl TextureAtlas {
    /// Copy every placed texture into a fresh `side × side` buffer.
    ///
    /// Placements whose name has no texture are kept as rectangles but leave
    /// the buffer transparent.
    pub fn compose(side: u32, packing: &Packing, textures: &BTreeMap<String, RgbaImage>) -> Self {
        let mut image = RgbaImage::new(side, side);
        let mut placements = BTreeMap::new();

        for placed in &packing.placements {
            match textures.get(&placed.name) {
                Some(texture) => {
                    image::imageops::replace(&mut image, texture, placed.x as i64, placed.y as i64);
                }
                None => log::warn!("atlas: no pixels for '{}'", placed.name),
            }
            placements.insert(placed.name.clone(), placed.rect());
        }

        Self { image, placements, packed_width: packing.width, packed_height: packing.height }
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Side length of the atlas buffer.
    #[inline]
    pub fn side(&self) -> u32 {
        self.image.width()
    }

    pub fn placement(&self, key: &str) -> Option<IntRect> {
        self.placements.get(key).copied()
    }

    #[inline]
    pub fn placements(&self) -> &BTreeMap<String, IntRect> {
        &self.placements
    }

    /// Bounding box actually used by the packed textures.
    #[inline]
    pub fn packed_size(&self) -> (u32, u32) {
        (self.packed_width, self.packed_height)
    }

    /// Placement of `key` in `[0, 1]` texture space.
    pub fn uv_rect(&self, key: &str) -> Option<UvRect> {
        let rect = self.placement(key)?;
        let side = self.side().max(1) as f32;
        Some(UvRect {
            uv_min: [rect.left as f32 / side, rect.top as f32 / side],
            uv_max: [rect.right() as f32 / side, rect.bottom() as f32 / side],
        })
    }

    /// Write the atlas buffer as a PNG.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| ResourceError::Image { path: path.to_path_buf(), source })
    }
}
