use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use glam::IVec2;
use image::{Rgba, RgbaImage};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::atlas::{TextureAtlas, packer};
use crate::config::PipelineConfig;
use crate::error::{ResourceError, Result};
use crate::geometry::IntRect;
use crate::resources::{
    Animation, BlobTexture, ConnectedTexture, FenceTexture, Relocatable, VertexQuad, WeightedTexture,
};

/// Key of the generated placeholder texture.
pub const DEFAULT_TEXTURE_KEY: &str = "default";

/// Suffix of the key a connected texture's image is stored and packed under.
pub const CONNECTED_SUFFIX: &str = "_connected";

const ANIMATION_EXTENSION: &str = ".animation.json";
const VARIATIONS_EXTENSION: &str = ".variations.json";
const CONNECTED_FENCE_EXTENSION: &str = "_connected_fence.png";
const CONNECTED_BLOB_EXTENSION: &str = "_connected_blob.png";

const PLACEHOLDER_SIDE: u32 = 16;
const PLACEHOLDER_CELL: u32 = 8;

// ── Side-car files ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnimationFile {
    frame_rate: u32,
}

#[derive(Debug, Deserialize)]
struct VariationsFile {
    variations: Vec<VariationEntry>,
}

#[derive(Debug, Deserialize)]
struct VariationEntry {
    weight: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ConnectedKind {
    Fence,
    Blob,
}

/// Parse a JSON side-car file.
pub(crate) fn read_side_car<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| ResourceError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes).map_err(|source| ResourceError::SideCar { path: path.to_path_buf(), source })
}

/// `dir/name.png` + `".animation.json"` → `dir/name.animation.json`.
pub(crate) fn side_car_path(path: &Path, suffix: &str) -> PathBuf {
    let mut stem: OsString = path.with_extension("").into_os_string();
    stem.push(suffix);
    PathBuf::from(stem)
}

// ── ResourceManager ──────────────────────────────────────────────────────────

/// Owns every loaded texture and the geometry derived from it.
///
/// Textures are loaded one by one with [`load_texture`](Self::load_texture),
/// then packed once with [`build_texture_atlas`](Self::build_texture_atlas).
/// The build moves every quad, animation, variation set and connected
/// texture to its atlas position; afterwards the manager is read-only.
#[derive(Debug)]
pub struct ResourceManager {
    config: PipelineConfig,
    textures: BTreeMap<String, RgbaImage>,
    vertex_quads: BTreeMap<String, VertexQuad>,
    animations: BTreeMap<String, Animation>,
    variations: BTreeMap<String, WeightedTexture>,
    /// Keyed by `<key>_connected`, the same key as the connected image.
    connected_textures: BTreeMap<String, Box<dyn ConnectedTexture>>,
    atlas: Option<TextureAtlas>,
}

impl ResourceManager {
    pub fn new(config: PipelineConfig) -> Self {
        let mut manager = Self {
            config,
            textures: BTreeMap::new(),
            vertex_quads: BTreeMap::new(),
            animations: BTreeMap::new(),
            variations: BTreeMap::new(),
            connected_textures: BTreeMap::new(),
            atlas: None,
        };
        let placeholder = placeholder_texture();
        let rect = IntRect::from_size(placeholder.width(), placeholder.height());
        manager.set_texture(DEFAULT_TEXTURE_KEY, placeholder, rect);
        manager
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Load the image at `path` under `key` together with its side-car files.
    ///
    /// Missing files, empty arguments, already loaded keys and undecodable
    /// images are logged and skipped. Images without side-cars are cropped to
    /// their opaque pixels. Malformed side-cars are errors, as is any load
    /// after the atlas has been built.
    pub fn load_texture(&mut self, path: impl AsRef<Path>, key: &str) -> Result<()> {
        let path = path.as_ref();
        self.ensure_not_built(key)?;

        if path.as_os_str().is_empty() {
            log::warn!("load_texture: empty path for '{key}'");
            return Ok(());
        }
        if !path.is_file() {
            log::warn!("load_texture: no file at {path:?}");
            return Ok(());
        }
        if key.is_empty() {
            log::warn!("load_texture: empty key for {path:?}");
            return Ok(());
        }
        if self.textures.contains_key(key) {
            log::info!("texture already loaded: '{key}'");
            return Ok(());
        }

        let image = match image::open(path) {
            Ok(image) => image.to_rgba8(),
            Err(err) => {
                log::warn!("load_texture: failed to decode {path:?}: {err}");
                return Ok(());
            }
        };
        let full = IntRect::from_size(image.width(), image.height());
        self.set_texture(key, image, full);
        log::info!("loaded texture '{key}' from {path:?}");

        if !self.load_side_cars(path, key)? {
            self.crop_to_content(key);
        }
        Ok(())
    }

    /// Load whichever side-car files exist next to `path`. Returns whether
    /// any were found.
    ///
    /// Also used directly for entries that have side-car files but no base
    /// image of their own.
    pub fn load_side_cars(&mut self, path: impl AsRef<Path>, key: &str) -> Result<bool> {
        let path = path.as_ref();
        self.ensure_not_built(key)?;
        let mut found = false;

        let animation = side_car_path(path, ANIMATION_EXTENSION);
        if animation.is_file() {
            log::debug!("found animation file {animation:?}");
            self.load_animation(&animation, key)?;
            found = true;
        }

        let variations = side_car_path(path, VARIATIONS_EXTENSION);
        if variations.is_file() {
            log::debug!("found variations file {variations:?}");
            self.load_variations(&variations, key)?;
            found = true;
        }

        let connected = [
            (CONNECTED_FENCE_EXTENSION, ConnectedKind::Fence),
            (CONNECTED_BLOB_EXTENSION, ConnectedKind::Blob),
        ];
        if let Some((file, kind)) = connected
            .into_iter()
            .map(|(suffix, kind)| (side_car_path(path, suffix), kind))
            .find(|(file, _)| file.is_file())
        {
            log::debug!("found connected texture file {file:?}");
            self.load_connected_texture(&file, key, kind)?;
            found = true;
        }

        Ok(found)
    }

    fn load_animation(&mut self, file: &Path, key: &str) -> Result<()> {
        if self.animations.contains_key(key) {
            log::info!("animation already loaded: '{key}'");
            return Ok(());
        }
        let side_car: AnimationFile = read_side_car(file)?;
        let frames = self.strip_rects(key);
        let frame_count = frames.len();
        let animation = Animation::new(frames, side_car.frame_rate, true)?;
        log::info!("loaded animation '{key}' ({frame_count} frames, {} fps)", side_car.frame_rate);
        self.animations.insert(key.to_string(), animation);
        Ok(())
    }

    fn load_variations(&mut self, file: &Path, key: &str) -> Result<()> {
        if self.variations.contains_key(key) {
            log::info!("variations already loaded: '{key}'");
            return Ok(());
        }
        let side_car: VariationsFile = read_side_car(file)?;
        let weights = side_car.variations.iter().map(|v| v.weight).collect();
        let variations = WeightedTexture::new(self.strip_rects(key), weights)?;
        log::info!("loaded variations '{key}' ({} variations)", variations.len());
        self.variations.insert(key.to_string(), variations);
        Ok(())
    }

    fn load_connected_texture(&mut self, file: &Path, key: &str, kind: ConnectedKind) -> Result<()> {
        let connected_key = format!("{key}{CONNECTED_SUFFIX}");
        if self.connected_textures.contains_key(&connected_key) {
            log::info!("connected texture already loaded: '{key}'");
            return Ok(());
        }

        let image = image::open(file)
            .map_err(|source| ResourceError::Image { path: file.to_path_buf(), source })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        let connected: Box<dyn ConnectedTexture> = match kind {
            ConnectedKind::Fence => Box::new(FenceTexture::new(width, height)?),
            ConnectedKind::Blob => Box::new(BlobTexture::new(width, height)?),
        };

        log::info!("loaded {} connected texture '{connected_key}'", connected.kind());
        self.set_texture(&connected_key, image, IntRect::from_size(width, height));
        self.connected_textures.insert(connected_key, connected);
        Ok(())
    }

    fn set_texture(&mut self, key: &str, image: RgbaImage, rect: IntRect) {
        self.textures.insert(key.to_string(), image);
        let scale = self.config.scale_for(key);
        let quad = self.vertex_quads.entry(key.to_string()).or_default();
        quad.set_texture_rect(rect);
        quad.set_scale(scale);
    }

    /// Replace the texture under `key` with its opaque bounding box. The
    /// local rectangle keeps the box's offset inside the source image.
    fn crop_to_content(&mut self, key: &str) {
        let Some(texture) = self.textures.get(key) else { return };
        let Some(bounds) = min_opaque_rect(texture) else {
            log::debug!("'{key}' is fully transparent; keeping full bounds");
            return;
        };
        if bounds == IntRect::from_size(texture.width(), texture.height()) {
            return;
        }
        let cropped = image::imageops::crop_imm(
            texture,
            bounds.left as u32,
            bounds.top as u32,
            bounds.width as u32,
            bounds.height as u32,
        )
        .to_image();
        log::debug!("cropped '{key}' to {bounds:?}");
        self.set_texture(key, cropped, bounds);
    }

    /// Frames of a horizontal strip: square cells as tall as the image.
    /// Keys without a texture fall back to the placeholder.
    fn strip_rects(&self, key: &str) -> Vec<IntRect> {
        let texture = match self.textures.get(key) {
            Some(texture) => texture,
            None => {
                log::warn!("no texture for '{key}'; slicing the placeholder");
                match self.textures.get(DEFAULT_TEXTURE_KEY) {
                    Some(texture) => texture,
                    None => return Vec::new(),
                }
            }
        };
        let (width, height) = texture.dimensions();
        if height == 0 {
            return Vec::new();
        }
        let side = height as i32;
        (0..(width / height) as i32).map(|i| IntRect::new(i * side, 0, side, side)).collect()
    }

    fn ensure_not_built(&self, key: &str) -> Result<()> {
        match self.atlas {
            Some(_) => Err(ResourceError::AtlasFrozen { key: key.to_string() }),
            None => Ok(()),
        }
    }

    // ── Atlas ────────────────────────────────────────────────────────────────

    /// Pack every loaded texture into the atlas and move all derived geometry
    /// to its packed position.
    ///
    /// Runs once; later calls are logged and ignored. Fails without touching
    /// anything if the textures do not fit.
    pub fn build_texture_atlas(&mut self) -> Result<()> {
        if self.atlas.is_some() {
            log::warn!("texture atlas already built");
            return Ok(());
        }

        let items: Vec<(String, u32, u32)> = self
            .vertex_quads
            .iter()
            .map(|(key, quad)| {
                let rect = quad.texture_rect();
                (key.clone(), rect.width.max(0) as u32, rect.height.max(0) as u32)
            })
            .collect();
        let packing = packer::pack(&items, self.config.max_atlas_side, self.config.discard_step)?;
        let atlas = TextureAtlas::compose(self.config.max_atlas_side, &packing, &self.textures);

        let mut placeholder_offset = IVec2::ZERO;
        for placed in &packing.placements {
            let Some(quad) = self.vertex_quads.get_mut(&placed.name) else { continue };
            let rect = placed.rect();
            let offset = rect.position() - quad.texture_rect().position();
            quad.set_texture_rect(rect);
            log::debug!("'{}' placed at {rect:?}", placed.name);
            if placed.name == DEFAULT_TEXTURE_KEY {
                placeholder_offset = offset;
            }

            if let Some(animation) = self.animations.get_mut(&placed.name) {
                animation.translate(offset);
            }
            if let Some(variations) = self.variations.get_mut(&placed.name) {
                variations.translate(offset);
            }
            if let Some(connected) = self.connected_textures.get_mut(&placed.name) {
                connected.translate(offset);
            }
        }

        // Side-cars loaded without a base image were sliced from the placeholder.
        for (key, animation) in &mut self.animations {
            if !self.vertex_quads.contains_key(key) {
                animation.translate(placeholder_offset);
            }
        }
        for (key, variations) in &mut self.variations {
            if !self.vertex_quads.contains_key(key) {
                variations.translate(placeholder_offset);
            }
        }

        let (width, height) = atlas.packed_size();
        log::info!("texture atlas: {} textures packed into {width}x{height}", packing.placements.len());

        if let Some(path) = &self.config.atlas_dump_path {
            match atlas.save(path) {
                Ok(()) => log::info!("texture atlas written to {path:?}"),
                Err(err) => log::warn!("could not write texture atlas: {err}"),
            }
        }
        self.atlas = Some(atlas);
        Ok(())
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.atlas.is_some()
    }

    /// The composed atlas, once built.
    #[inline]
    pub fn texture_atlas(&self) -> Option<&TextureAtlas> {
        self.atlas.as_ref()
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    pub fn has_texture(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }

    /// Keys of every loaded texture, placeholder included.
    pub fn texture_keys(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    /// Quad for `key`, or the placeholder's quad if nothing is loaded under
    /// that key.
    pub fn vertex_quad(&self, key: &str) -> VertexQuad {
        match self.vertex_quads.get(key) {
            Some(quad) => *quad,
            None => {
                log::warn!("vertex quad not loaded: '{key}'; using placeholder");
                self.vertex_quads.get(DEFAULT_TEXTURE_KEY).copied().unwrap_or_default()
            }
        }
    }

    pub fn texture_rect(&self, key: &str) -> IntRect {
        self.vertex_quad(key).texture_rect()
    }

    pub fn has_animation(&self, key: &str) -> bool {
        self.animations.contains_key(key)
    }

    pub fn animation(&self, key: &str) -> Result<&Animation> {
        self.animations
            .get(key)
            .ok_or_else(|| ResourceError::NotLoaded { kind: "animation", key: key.to_string() })
    }

    pub fn has_variations(&self, key: &str) -> bool {
        self.variations.contains_key(key)
    }

    pub fn variations(&self, key: &str) -> Result<&WeightedTexture> {
        self.variations
            .get(key)
            .ok_or_else(|| ResourceError::NotLoaded { kind: "variations", key: key.to_string() })
    }

    /// Takes the plain key; the `_connected` suffix is added here.
    pub fn has_connected_texture(&self, key: &str) -> bool {
        self.connected_textures.contains_key(&format!("{key}{CONNECTED_SUFFIX}"))
    }

    pub fn connected_texture(&self, key: &str) -> Result<&dyn ConnectedTexture> {
        self.connected_textures
            .get(&format!("{key}{CONNECTED_SUFFIX}"))
            .map(|connected| connected.as_ref())
            .ok_or_else(|| ResourceError::NotLoaded { kind: "connected texture", key: key.to_string() })
    }
}

// ── Image helpers ────────────────────────────────────────────────────────────

/// 16×16 magenta/black checkerboard.
fn placeholder_texture() -> RgbaImage {
    RgbaImage::from_fn(PLACEHOLDER_SIDE, PLACEHOLDER_SIDE, |x, y| {
        if (x / PLACEHOLDER_CELL + y / PLACEHOLDER_CELL) % 2 == 0 {
            Rgba([255, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

/// Smallest rectangle holding every pixel with non-zero alpha, or `None` for
/// a fully transparent image.
pub(crate) fn min_opaque_rect(image: &RgbaImage) -> Option<IntRect> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
        });
    }
    bounds.map(|(min_x, min_y, max_x, max_y)| {
        IntRect::new(min_x as i32, min_y as i32, (max_x - min_x + 1) as i32, (max_y - min_y + 1) as i32)
    })
}
