mod common;

use std::path::Path;

use glam::IVec2;
use tileforge::config::{UI_SPRITE_SCALE, WORLD_SPRITE_SCALE};
use tileforge::geometry::IntRect;
use tileforge::resources::{DEFAULT_TEXTURE_KEY, Relocatable, ResourceManager};
use tileforge::{PipelineConfig, ResourceError};

use common::{OPAQUE, opaque, with_block, write_json, write_png};

fn manager(root: &Path) -> ResourceManager {
    ResourceManager::new(PipelineConfig::with_root(root))
}

// ── Loading ──────────────────────────────────────────────────────────────────

#[test]
fn load_texture_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.png");
    let second = dir.path().join("b.png");
    write_png(&first, &opaque(16, 16));
    write_png(&second, &opaque(32, 8));

    let mut resources = manager(dir.path());
    resources.load_texture(&first, "tile.a").unwrap();
    let count = resources.texture_keys().count();
    resources.load_texture(&first, "tile.a").unwrap();
    resources.load_texture(&second, "tile.a").unwrap();

    assert_eq!(resources.texture_keys().count(), count);
    assert_eq!(resources.texture_rect("tile.a"), IntRect::new(0, 0, 16, 16));
}

#[test]
fn plain_images_are_cropped_to_opaque_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rock.png");
    write_png(&path, &with_block(16, 16, 4, 2, 8, 12));

    let mut resources = manager(dir.path());
    resources.load_texture(&path, "object.rock").unwrap();
    assert_eq!(resources.texture_rect("object.rock"), IntRect::new(4, 2, 8, 12));
}

#[test]
fn transparent_image_keeps_full_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ghost.png");
    write_png(&path, &with_block(8, 8, 0, 0, 0, 0));

    let mut resources = manager(dir.path());
    resources.load_texture(&path, "tile.ghost").unwrap();
    assert_eq!(resources.texture_rect("tile.ghost"), IntRect::new(0, 0, 8, 8));
}

#[test]
fn images_with_side_cars_are_not_cropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flame.png");
    write_png(&path, &with_block(32, 16, 2, 2, 4, 4));
    write_json(&dir.path().join("flame.animation.json"), r#"{ "frame_rate": 4 }"#);

    let mut resources = manager(dir.path());
    resources.load_texture(&path, "object.flame").unwrap();
    assert_eq!(resources.texture_rect("object.flame"), IntRect::new(0, 0, 32, 16));
    assert_eq!(resources.animation("object.flame").unwrap().frames().len(), 2);
}

#[test]
fn missing_or_invalid_inputs_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("broken.png");
    write_json(&garbage, "definitely not a png");
    let good = dir.path().join("good.png");
    write_png(&good, &opaque(4, 4));

    let mut resources = manager(dir.path());
    resources.load_texture(dir.path().join("missing.png"), "tile.missing").unwrap();
    resources.load_texture("", "tile.empty").unwrap();
    resources.load_texture(&good, "").unwrap();
    resources.load_texture(&garbage, "tile.broken").unwrap();

    assert!(!resources.has_texture("tile.missing"));
    assert!(!resources.has_texture("tile.empty"));
    assert!(!resources.has_texture("tile.broken"));
    assert_eq!(resources.texture_keys().collect::<Vec<_>>(), vec![DEFAULT_TEXTURE_KEY]);
}

#[test]
fn scale_depends_on_category() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.png");
    write_png(&path, &opaque(8, 8));

    let mut resources = manager(dir.path());
    resources.load_texture(&path, "ui.button").unwrap();
    resources.load_texture(&path, "tile.ruins").unwrap();
    assert_eq!(resources.vertex_quad("ui.button").scale(), UI_SPRITE_SCALE);
    assert_eq!(resources.vertex_quad("tile.ruins").scale(), WORLD_SPRITE_SCALE);
}

// ── Side-car errors ──────────────────────────────────────────────────────────

#[test]
fn malformed_side_car_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.png");
    write_png(&path, &opaque(16, 16));
    write_json(&dir.path().join("bad.animation.json"), "{ frame_rate: }");

    let err = manager(dir.path()).load_texture(&path, "tile.bad").unwrap_err();
    assert!(matches!(err, ResourceError::SideCar { .. }), "{err}");
}

#[test]
fn variation_count_must_match_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grass.png");
    write_png(&path, &opaque(48, 16));
    write_json(&dir.path().join("grass.variations.json"), r#"{ "variations": [ { "weight": 1 }, { "weight": 2 } ] }"#);

    let err = manager(dir.path()).load_texture(&path, "tile.grass").unwrap_err();
    assert!(matches!(err, ResourceError::InvalidWeights(_)), "{err}");
}

#[test]
fn connected_texture_dimensions_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall.png");
    write_png(&path, &opaque(16, 16));
    write_png(&dir.path().join("wall_connected_blob.png"), &opaque(100, 100));

    let err = manager(dir.path()).load_texture(&path, "tile.wall").unwrap_err();
    assert!(matches!(err, ResourceError::InvalidConnectedTexture(_)), "{err}");
}

#[test]
fn fence_wins_over_blob() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fence.png");
    write_png(&path, &opaque(16, 16));
    write_png(&dir.path().join("fence_connected_fence.png"), &opaque(64, 64));
    write_png(&dir.path().join("fence_connected_blob.png"), &opaque(112, 112));

    let mut resources = manager(dir.path());
    resources.load_texture(&path, "object.fence").unwrap();
    assert_eq!(resources.connected_texture("object.fence").unwrap().kind(), "fence");
    assert!(resources.has_texture("object.fence_connected"));
    assert_eq!(resources.texture_rect("object.fence_connected"), IntRect::new(0, 0, 64, 64));
}

#[test]
fn lookups_of_unloaded_keys_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let resources = manager(dir.path());
    assert!(!resources.has_animation("entity.nobody"));
    assert!(matches!(resources.animation("entity.nobody"), Err(ResourceError::NotLoaded { .. })));
    assert!(matches!(resources.variations("tile.nothing"), Err(ResourceError::NotLoaded { .. })));
    assert!(matches!(resources.connected_texture("tile.nothing"), Err(ResourceError::NotLoaded { .. })));
}

// ── Atlas build ──────────────────────────────────────────────────────────────

/// Loads one texture of every kind: animated, varied, connected and cropped.
fn populated(dir: &Path) -> ResourceManager {
    write_png(&dir.join("player.png"), &opaque(48, 16));
    write_json(&dir.join("player.animation.json"), r#"{ "frame_rate": 8 }"#);
    write_png(&dir.join("grass.png"), &opaque(48, 16));
    write_json(
        &dir.join("grass.variations.json"),
        r#"{ "variations": [ { "weight": 1 }, { "weight": 1 }, { "weight": 2 } ] }"#,
    );
    write_png(&dir.join("water.png"), &opaque(16, 16));
    write_png(&dir.join("water_connected_blob.png"), &opaque(112, 112));
    write_png(&dir.join("rock.png"), &with_block(16, 16, 4, 2, 8, 12));

    let mut resources = manager(dir);
    resources.load_texture(dir.join("player.png"), "entity.player").unwrap();
    resources.load_texture(dir.join("grass.png"), "tile.grass").unwrap();
    resources.load_texture(dir.join("water.png"), "tile.water").unwrap();
    resources.load_texture(dir.join("rock.png"), "object.rock").unwrap();
    resources
}

#[test]
fn build_packs_without_overlap_and_keeps_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let mut resources = populated(dir.path());
    let keys: Vec<String> = resources.texture_keys().map(str::to_string).collect();
    let before: Vec<IntRect> = keys.iter().map(|k| resources.texture_rect(k)).collect();

    resources.build_texture_atlas().unwrap();
    let atlas = resources.texture_atlas().unwrap();
    let bounds = IntRect::from_size(atlas.side(), atlas.side());

    let after: Vec<IntRect> = keys.iter().map(|k| resources.texture_rect(k)).collect();
    for (key, (old, new)) in keys.iter().zip(before.iter().zip(&after)) {
        assert_eq!(old.size(), new.size(), "{key} changed size");
        assert!(bounds.contains_rect(new), "{key} outside the atlas");
        assert_eq!(atlas.placement(key), Some(*new));
    }
    for (i, a) in after.iter().enumerate() {
        for b in &after[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn build_moves_derived_geometry_with_its_texture() {
    let dir = tempfile::tempdir().unwrap();
    let mut resources = populated(dir.path());
    let frames_before = resources.animation("entity.player").unwrap().frames().to_vec();
    let variations_before = resources.variations("tile.grass").unwrap().variations().to_vec();
    let grid_before = resources.connected_texture("tile.water").unwrap().grid().rects().to_vec();
    let quad_before = |resources: &ResourceManager, key: &str| resources.texture_rect(key).position();
    let player_old = quad_before(&resources, "entity.player");
    let grass_old = quad_before(&resources, "tile.grass");
    let water_old = quad_before(&resources, "tile.water_connected");

    resources.build_texture_atlas().unwrap();

    let player_offset = resources.texture_rect("entity.player").position() - player_old;
    for (after, before) in resources.animation("entity.player").unwrap().frames().iter().zip(&frames_before) {
        assert_eq!(*after, before.translated(player_offset));
    }

    let grass_offset = resources.texture_rect("tile.grass").position() - grass_old;
    for (after, before) in resources.variations("tile.grass").unwrap().variations().iter().zip(&variations_before) {
        assert_eq!(*after, before.translated(grass_offset));
    }

    let water_offset = resources.texture_rect("tile.water_connected").position() - water_old;
    let connected = resources.connected_texture("tile.water").unwrap();
    for (after, before) in connected.grid().rects().iter().zip(&grid_before) {
        assert_eq!(*after, before.translated(water_offset));
    }
    assert_eq!(connected.origin(), resources.texture_rect("tile.water_connected").position());
}

#[test]
fn atlas_holds_the_cropped_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let mut resources = populated(dir.path());
    resources.build_texture_atlas().unwrap();

    let rect = resources.texture_rect("object.rock");
    assert_eq!(rect.size(), IVec2::new(8, 12));
    let image = resources.texture_atlas().unwrap().image();
    assert_eq!(*image.get_pixel(rect.left as u32, rect.top as u32), OPAQUE);
    assert_eq!(*image.get_pixel((rect.right() - 1) as u32, (rect.bottom() - 1) as u32), OPAQUE);
}

#[test]
fn geometry_miss_returns_packed_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let mut resources = populated(dir.path());
    resources.build_texture_atlas().unwrap();
    let placeholder = resources.texture_atlas().unwrap().placement(DEFAULT_TEXTURE_KEY).unwrap();
    assert_eq!(resources.texture_rect("tile.unknown"), placeholder);
}

#[test]
fn build_runs_once_and_freezes_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut resources = populated(dir.path());
    resources.build_texture_atlas().unwrap();
    let placed = resources.texture_rect("tile.grass");

    resources.build_texture_atlas().unwrap();
    assert_eq!(resources.texture_rect("tile.grass"), placed);

    let err = resources.load_texture(dir.path().join("rock.png"), "object.rock2").unwrap_err();
    assert!(matches!(err, ResourceError::AtlasFrozen { .. }));
}

#[test]
fn overflow_leaves_nothing_built() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.png");
    write_png(&path, &opaque(32, 32));

    let config = PipelineConfig { max_atlas_side: 16, ..PipelineConfig::with_root(dir.path()) };
    let mut resources = ResourceManager::new(config);
    resources.load_texture(&path, "tile.huge").unwrap();

    let err = resources.build_texture_atlas().unwrap_err();
    assert!(matches!(err, ResourceError::AtlasOverflow { max_side: 16, .. }));
    assert!(!resources.is_built());
    assert_eq!(resources.texture_rect("tile.huge"), IntRect::new(0, 0, 32, 32));
}

#[test]
fn atlas_dump_is_written_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("out").join("atlas.png");
    std::fs::create_dir_all(dump.parent().unwrap()).unwrap();
    let config = PipelineConfig { atlas_dump_path: Some(dump.clone()), ..PipelineConfig::with_root(dir.path()) };

    let mut resources = ResourceManager::new(config);
    resources.build_texture_atlas().unwrap();
    let written = image::open(&dump).unwrap();
    assert_eq!(written.width(), 1024);
}
