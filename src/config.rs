use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ResourceError, Result};

// ── Grid constants ───────────────────────────────────────────────────────────

/// Size of one world grid cell in texture pixels. A 16×16 sprite fills one
/// cell; 16.0 exactly shows seams between tiles, so the cell is a hair smaller.
pub const WORLD_GRID_CELL_SIZE: f32 = 15.999;

/// Size of one UI grid cell in texture pixels.
pub const UI_GRID_CELL_SIZE: f32 = 8.0;

/// Scale applied to every world-namespace quad (pixels → world units).
pub const WORLD_SPRITE_SCALE: f32 = 1.0 / WORLD_GRID_CELL_SIZE;

/// Scale applied to every `ui.*` quad (pixels → UI cells).
pub const UI_SPRITE_SCALE: f32 = 1.0 / UI_GRID_CELL_SIZE;

// ── PipelineConfig ───────────────────────────────────────────────────────────

/// Settings for loading resources and building the texture atlas.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "resources_root": "assets", "max_atlas_side": 2048 }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Folder holding `tile/`, `object/`, `entity/` and `ui/`.
    pub resources_root: PathBuf,
    /// Side length of the square atlas buffer in pixels.
    pub max_atlas_side: u32,
    /// Packing search threshold. Candidate bins closer than `|discard_step|`
    /// pixels to a known fit are not tried. A negative value additionally
    /// shrinks width and height independently once the best square is found.
    pub discard_step: i32,
    pub world_sprite_scale: f32,
    pub ui_sprite_scale: f32,
    /// Where to write the composed atlas after a build, if anywhere.
    pub atlas_dump_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resources_root: PathBuf::from("resources"),
            max_atlas_side: 1024,
            discard_step: -4,
            world_sprite_scale: WORLD_SPRITE_SCALE,
            ui_sprite_scale: UI_SPRITE_SCALE,
            atlas_dump_path: None,
        }
    }
}

impl PipelineConfig {
    /// Default settings rooted at `resources_root`.
    pub fn with_root(resources_root: impl Into<PathBuf>) -> Self {
        Self { resources_root: resources_root.into(), ..Self::default() }
    }

    /// Parse a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|source| ResourceError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_slice(&bytes)
            .map_err(|source| ResourceError::Config { path: path.to_path_buf(), source })
    }

    /// Scale for a registry name: `ui.*` keys use the UI scale, everything
    /// else the world scale.
    pub fn scale_for(&self, registry_name: &str) -> f32 {
        match registry_name.split_once('.') {
            Some(("ui", _)) => self.ui_sprite_scale,
            _ => self.world_sprite_scale,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
