use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::error::{ResourceError, Result};
use crate::geometry::{Aabb, DimensionsFile, IntRect, PointFile};
use crate::resources::manager::{ResourceManager, read_side_car};
use crate::resources::Animation;

/// Maximum health of an entity whose description does not set one.
pub const MAX_HEALTH_DEFAULT: u32 = 10;

const OBJECT_JSON_SUFFIX: &str = ".object.json";
const IMAGE_EXTENSION: &str = "png";
const CONNECTED_IMAGE_SUFFIXES: [&str; 2] = ["_connected_fence", "_connected_blob"];
const UI_STATE_SUFFIXES: [&str; 2] = ["_hovered", "_clicked"];

// ── Registry names ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Tile,
    Object,
    Entity,
    Ui,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Tile, Category::Object, Category::Entity, Category::Ui];

    pub fn prefix(self) -> &'static str {
        match self {
            Category::Tile => "tile",
            Category::Object => "object",
            Category::Entity => "entity",
            Category::Ui => "ui",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.prefix() == prefix)
    }
}

/// `<category>.<identifier>`, e.g. `tile.grass`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryName {
    category: Category,
    identifier: String,
}

impl RegistryName {
    pub fn new(category: Category, identifier: impl Into<String>) -> Self {
        Self { category, identifier: identifier.into() }
    }

    /// Split at the first `.`. Fails on a missing dot, an empty side or an
    /// unknown category.
    pub fn parse(name: &str) -> Option<Self> {
        let (prefix, identifier) = name.split_once('.')?;
        if identifier.is_empty() {
            return None;
        }
        Some(Self::new(Category::from_prefix(prefix)?, identifier))
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for RegistryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category.prefix(), self.identifier)
    }
}

/// Prefix `name` with `category` unless it already carries it.
fn qualify(name: &str, category: Category) -> String {
    match name.split_once('.') {
        Some((prefix, _)) if prefix == category.prefix() => name.to_string(),
        _ => format!("{}.{name}", category.prefix()),
    }
}

// ── Entry records ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileData {
    pub registry_name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectData {
    pub tile: TileData,
    /// Collision box in world units, relative to the sprite's top-left.
    pub footprint: Aabb,
}

impl ObjectData {
    pub fn registry_name(&self) -> &str {
        &self.tile.registry_name
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityData {
    pub object: ObjectData,
    pub max_health: u32,
    /// Every animation found in the entity's folder, by registry name.
    pub animations: BTreeMap<String, Animation>,
}

impl Default for EntityData {
    fn default() -> Self {
        Self { object: ObjectData::default(), max_health: MAX_HEALTH_DEFAULT, animations: BTreeMap::new() }
    }
}

impl EntityData {
    pub fn registry_name(&self) -> &str {
        self.object.registry_name()
    }
}

#[derive(Debug, Deserialize)]
struct ObjectFile {
    footprint: FootprintFile,
}

#[derive(Debug, Deserialize)]
struct FootprintFile {
    position: PointFile,
    dimensions: DimensionsFile,
}

/// Bottom half of the sprite, scaled to world units. For an animation strip
/// the rectangle is the whole strip, not one frame.
fn default_footprint(rect: IntRect, scale: f32) -> Aabb {
    let half_height = (rect.height / 2) as f32;
    Aabb::new(Vec2::new(0.0, half_height) * scale, Vec2::new(rect.width as f32, half_height) * scale)
}

// ── GameRegistry ─────────────────────────────────────────────────────────────

/// Maps registry names to entry records and loads their resources.
///
/// Registering an entry loads its image and side-car files right away.
/// Once everything is registered, [`build_texture_atlas`] packs it all;
/// after that the registry only answers lookups.
///
/// [`build_texture_atlas`]: GameRegistry::build_texture_atlas
#[derive(Debug)]
pub struct GameRegistry {
    resources: ResourceManager,
    tiles: BTreeMap<String, TileData>,
    objects: BTreeMap<String, ObjectData>,
    entities: BTreeMap<String, EntityData>,
    ui: BTreeSet<String>,
}

impl GameRegistry {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            resources: ResourceManager::new(config),
            tiles: BTreeMap::new(),
            objects: BTreeMap::new(),
            entities: BTreeMap::new(),
            ui: BTreeSet::new(),
        }
    }

    /// Register every name in `names`, then build the atlas.
    pub fn load<I, S>(config: PipelineConfig, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new(config);
        for name in names {
            registry.register_entry(name.as_ref())?;
        }
        registry.build_texture_atlas()?;
        Ok(registry)
    }

    #[inline]
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        self.resources.config()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tiles.contains_key(name)
            || self.objects.contains_key(name)
            || self.entities.contains_key(name)
            || self.ui.contains(name)
    }

    /// Every registered name, grouped by category.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.tiles
            .keys()
            .chain(self.objects.keys())
            .chain(self.entities.keys())
            .chain(self.ui.iter())
            .map(String::as_str)
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Register `name` and load its resources.
    ///
    /// Malformed names, unknown categories and duplicates are logged and
    /// ignored. Errors come from malformed side-car files or from registering
    /// after the atlas was built.
    pub fn register_entry(&mut self, name: &str) -> Result<()> {
        if self.resources.is_built() {
            return Err(ResourceError::AtlasFrozen { key: name.to_string() });
        }
        let Some(parsed) = RegistryName::parse(name) else {
            log::warn!("invalid registry name: '{name}'");
            return Ok(());
        };
        let key = parsed.to_string();
        if self.is_registered(&key) {
            log::warn!("'{key}' is already registered");
            return Ok(());
        }

        match parsed.category() {
            Category::Tile => {
                let data = self.create_tile_data(&parsed)?;
                self.tiles.insert(key, data);
            }
            Category::Object => {
                let data = self.create_object_data(&parsed)?;
                self.objects.insert(key, data);
            }
            Category::Entity => {
                let data = self.create_entity_data(&parsed)?;
                self.entities.insert(key, data);
            }
            Category::Ui => {
                self.load_entry_texture(&parsed)?;
                for suffix in UI_STATE_SUFFIXES {
                    let state = RegistryName::new(Category::Ui, format!("{}{suffix}", parsed.identifier()));
                    self.load_entry_texture(&state)?;
                }
                self.ui.insert(key);
            }
        }
        Ok(())
    }

    /// Pack every loaded texture and refresh the animation copies held by
    /// entity records.
    pub fn build_texture_atlas(&mut self) -> Result<()> {
        self.resources.build_texture_atlas()?;
        for entity in self.entities.values_mut() {
            for (key, animation) in &mut entity.animations {
                if let Ok(packed) = self.resources.animation(key) {
                    *animation = packed.clone();
                }
            }
        }
        Ok(())
    }

    fn create_tile_data(&mut self, name: &RegistryName) -> Result<TileData> {
        self.load_entry_texture(name)?;
        Ok(TileData { registry_name: name.to_string() })
    }

    fn create_object_data(&mut self, name: &RegistryName) -> Result<ObjectData> {
        let tile = self.create_tile_data(name)?;
        let object_file = self.entry_directory(name).join(format!("{}{OBJECT_JSON_SUFFIX}", name.identifier()));

        let footprint = if object_file.is_file() {
            log::debug!("found object file {object_file:?}");
            let file: ObjectFile = read_side_car(&object_file)?;
            let FootprintFile { position, dimensions } = file.footprint;
            Aabb::new(Vec2::new(position.x, position.y), Vec2::new(dimensions.width, dimensions.height))
        } else {
            let rect = self.resources.texture_rect(&tile.registry_name);
            default_footprint(rect, self.config().world_sprite_scale)
        };
        Ok(ObjectData { tile, footprint })
    }

    fn create_entity_data(&mut self, name: &RegistryName) -> Result<EntityData> {
        let object = self.create_object_data(name)?;
        let mut animations = BTreeMap::new();

        for path in entity_images(&self.entry_directory(name)) {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            let key = RegistryName::new(Category::Entity, stem).to_string();
            self.resources.load_texture(&path, &key)?;
            if self.resources.has_animation(&key) {
                animations.insert(key.clone(), self.resources.animation(&key)?.clone());
            }
        }

        Ok(EntityData { object, max_health: MAX_HEALTH_DEFAULT, animations })
    }

    /// Load the entry's base image, or only its side-car files when there is
    /// no base image.
    fn load_entry_texture(&mut self, name: &RegistryName) -> Result<()> {
        let path = self.texture_path(name);
        let key = name.to_string();
        if path.is_file() {
            return self.resources.load_texture(&path, &key);
        }
        if !self.resources.load_side_cars(&path, &key)? {
            log::warn!("no image or side-car files for '{key}' at {path:?}");
        }
        Ok(())
    }

    // ── Paths ────────────────────────────────────────────────────────────────

    /// `entity/<id>/` for entities, `<category>/` for everything else.
    pub fn entry_directory(&self, name: &RegistryName) -> PathBuf {
        let root = &self.config().resources_root;
        match name.category() {
            Category::Entity => root.join(Category::Entity.prefix()).join(name.identifier()),
            category => root.join(category.prefix()),
        }
    }

    pub fn texture_path(&self, name: &RegistryName) -> PathBuf {
        self.entry_directory(name).join(format!("{}.{IMAGE_EXTENSION}", name.identifier()))
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    /// Accepts `grass` or `tile.grass`. Unknown names log and return the
    /// default record.
    pub fn get_tile_data(&self, name: &str) -> TileData {
        lookup(&self.tiles, name, Category::Tile)
    }

    pub fn get_object_data(&self, name: &str) -> ObjectData {
        lookup(&self.objects, name, Category::Object)
    }

    /// Returns an owned record; each caller gets animations with their own
    /// playback state.
    pub fn get_entity_data(&self, name: &str) -> EntityData {
        lookup(&self.entities, name, Category::Entity)
    }
}

fn lookup<T: Clone + Default>(records: &BTreeMap<String, T>, name: &str, category: Category) -> T {
    let key = qualify(name, category);
    match records.get(&key) {
        Some(record) => record.clone(),
        None => {
            log::warn!("{} not found: '{name}'", category.prefix());
            T::default()
        }
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(IMAGE_EXTENSION)
}

fn is_connected_image(stem: &str) -> bool {
    CONNECTED_IMAGE_SUFFIXES.iter().any(|suffix| stem.ends_with(suffix))
}

/// PNGs directly inside an entity folder, connected-texture images excluded,
/// sorted by file name.
fn entity_images(folder: &Path) -> Vec<PathBuf> {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_png_extension(e.path()))
        .filter(|e| !e.path().file_stem().and_then(|s| s.to_str()).is_some_and(is_connected_image))
        .map(|e| e.into_path())
        .collect()
}

// ── Discovery ────────────────────────────────────────────────────────────────

/// Registry names of everything under `root`, sorted.
///
/// `tile/`, `object/` and `ui/` contribute one entry per image (connected
/// and UI state images fold into their base entry); `entity/` contributes
/// one entry per sub-folder.
pub fn discover_entries(root: impl AsRef<Path>) -> Vec<String> {
    let root = root.as_ref();
    let mut names = BTreeSet::new();

    for category in [Category::Tile, Category::Object, Category::Ui] {
        let folder = root.join(category.prefix());
        for entry in WalkDir::new(&folder).min_depth(1).max_depth(1).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() || !has_png_extension(entry.path()) {
                continue;
            }
            let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else { continue };
            let mut identifier = stem;
            for suffix in CONNECTED_IMAGE_SUFFIXES {
                identifier = identifier.strip_suffix(suffix).unwrap_or(identifier);
            }
            if category == Category::Ui {
                for suffix in UI_STATE_SUFFIXES {
                    identifier = identifier.strip_suffix(suffix).unwrap_or(identifier);
                }
            }
            if !identifier.is_empty() {
                names.insert(RegistryName::new(category, identifier).to_string());
            }
        }
    }

    let entity_folder = root.join(Category::Entity.prefix());
    for entry in WalkDir::new(&entity_folder).min_depth(1).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(identifier) = entry.file_name().to_str() {
            names.insert(RegistryName::new(Category::Entity, identifier).to_string());
        }
    }

    names.into_iter().collect()
}
