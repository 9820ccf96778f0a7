//! Connected textures: tiles whose sprite depends on which neighbours are the
//! same kind of tile (autotiling).
//!
//! The source image is a square grid of equally sized tiles. A neighbour
//! bitmask is encoded into an integer, and a fixed table maps that integer to
//! a grid cell.

mod blob;
mod fence;

use std::fmt::Debug;

use bitflags::bitflags;
use glam::IVec2;

use crate::error::{ResourceError, Result};
use crate::geometry::{ALL_DIRECTIONS, IntRect};
use crate::resources::Relocatable;

pub use blob::BlobTexture;
pub use fence::FenceTexture;

// ── Neighbours ────────────────────────────────────────────────────────────────

bitflags! {
    /// Which of the 8 surrounding cells are connected to the current one.
    ///
    /// Bit weights run clockwise from north, matching [`ALL_DIRECTIONS`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Neighbours: u8 {
        const NORTH      = 1;
        const NORTH_EAST = 1 << 1;
        const EAST       = 1 << 2;
        const SOUTH_EAST = 1 << 3;
        const SOUTH      = 1 << 4;
        const SOUTH_WEST = 1 << 5;
        const WEST       = 1 << 6;
        const NORTH_WEST = 1 << 7;
    }
}

impl Neighbours {
    /// Build a mask by asking `connected(dx, dy)` for each direction.
    pub fn from_fn(mut connected: impl FnMut(i32, i32) -> bool) -> Self {
        ALL_DIRECTIONS
            .iter()
            .enumerate()
            .filter(|&(_, &(dx, dy))| connected(dx, dy))
            .fold(Self::empty(), |mask, (bit, _)| mask | Self::from_bits_retain(1 << bit))
    }

    #[inline]
    pub fn north(self) -> bool {
        self.contains(Self::NORTH)
    }

    #[inline]
    pub fn north_east(self) -> bool {
        self.contains(Self::NORTH_EAST)
    }

    #[inline]
    pub fn east(self) -> bool {
        self.contains(Self::EAST)
    }

    #[inline]
    pub fn south_east(self) -> bool {
        self.contains(Self::SOUTH_EAST)
    }

    #[inline]
    pub fn south(self) -> bool {
        self.contains(Self::SOUTH)
    }

    #[inline]
    pub fn south_west(self) -> bool {
        self.contains(Self::SOUTH_WEST)
    }

    #[inline]
    pub fn west(self) -> bool {
        self.contains(Self::WEST)
    }

    #[inline]
    pub fn north_west(self) -> bool {
        self.contains(Self::NORTH_WEST)
    }
}

// ── Tile grid ─────────────────────────────────────────────────────────────────

/// Row-major `n × n` grid of square tile rectangles.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    rects: Vec<IntRect>,
    tiles_per_side: u32,
    tile_size: u32,
}

impl TileGrid {
    /// Cut a `width × height` image into `tiles_per_side²` tiles.
    ///
    /// The image must be square and its side an exact, non-zero multiple of
    /// `tiles_per_side`.
    pub fn new(width: u32, height: u32, tiles_per_side: u32) -> Result<Self> {
        if width != height {
            return Err(ResourceError::InvalidConnectedTexture(format!(
                "texture must be square, got {width}x{height}"
            )));
        }
        let tile_size = width / tiles_per_side.max(1);
        if tile_size == 0 {
            return Err(ResourceError::InvalidConnectedTexture(format!(
                "texture side {width} is too small for a {tiles_per_side}x{tiles_per_side} grid"
            )));
        }
        if width % tile_size != 0 || width / tile_size != tiles_per_side {
            return Err(ResourceError::InvalidConnectedTexture(format!(
                "texture side {width} must be a multiple of the tile size {tile_size}"
            )));
        }

        let n = tiles_per_side as i32;
        let size = tile_size as i32;
        let rects = (0..n * n)
            .map(|i| IntRect::new(i % n * size, i / n * size, size, size))
            .collect();
        Ok(Self { rects, tiles_per_side, tile_size })
    }

    #[inline]
    pub fn rects(&self) -> &[IntRect] {
        &self.rects
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<IntRect> {
        self.rects.get(index).copied()
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn tiles_per_side(&self) -> u32 {
        self.tiles_per_side
    }
}

impl Relocatable for TileGrid {
    fn origin(&self) -> IVec2 {
        self.rects[0].position()
    }

    fn move_to(&mut self, position: IVec2) {
        let offset = position - self.origin();
        for rect in &mut self.rects {
            *rect = rect.translated(offset);
        }
    }
}

/// Build a value → grid index table from a grid index → value list.
/// Values listed more than once keep their last grid index.
const fn mapping_table<const N: usize>(values: &[u8]) -> [Option<u8>; N] {
    let mut table = [None; N];
    let mut index = 0;
    while index < values.len() {
        table[values[index] as usize] = Some(index as u8);
        index += 1;
    }
    table
}

// ── ConnectedTexture ──────────────────────────────────────────────────────────

/// Neighbour-driven sprite selection over a [`TileGrid`].
pub trait ConnectedTexture: Relocatable + Debug + Send + Sync {
    /// Encode a neighbour mask into this texture's table index space.
    fn neighbours_to_int(&self, neighbours: Neighbours) -> u8;

    /// Grid cell for an already encoded value, or `None` when the value has
    /// no tile of its own.
    fn rect_for_value(&self, value: u8) -> Option<IntRect>;

    /// Encoded value with every relevant neighbour connected.
    fn get_all_neighbours(&self) -> u8;

    fn grid(&self) -> &TileGrid;

    /// Short name of the layout, used in diagnostics.
    fn kind(&self) -> &'static str;

    fn get_rect(&self, neighbours: Neighbours) -> Option<IntRect> {
        self.rect_for_value(self.neighbours_to_int(neighbours))
    }

    fn tile_size(&self) -> u32 {
        self.grid().tile_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_follows_direction_order() {
        let mask = Neighbours::from_fn(|dx, dy| (dx, dy) == (0, -1) || (dx, dy) == (-1, -1));
        assert_eq!(mask, Neighbours::NORTH | Neighbours::NORTH_WEST);
        assert_eq!(mask.bits(), 129);
        assert!(mask.north() && mask.north_west() && !mask.east());
    }

    #[test]
    fn grid_is_row_major() {
        let grid = TileGrid::new(64, 64, 4).unwrap();
        assert_eq!(grid.tile_size(), 16);
        assert_eq!(grid.rects().len(), 16);
        assert_eq!(grid.get(5), Some(IntRect::new(16, 16, 16, 16)));
        assert_eq!(grid.get(16), None);
    }

    #[test]
    fn grid_rejects_bad_dimensions() {
        assert!(TileGrid::new(64, 32, 4).is_err());
        assert!(TileGrid::new(70, 70, 4).is_err());
        assert!(TileGrid::new(3, 3, 4).is_err());
    }

    #[test]
    fn later_entries_win_in_mapping() {
        const TABLE: [Option<u8>; 4] = mapping_table(&[1, 0, 1]);
        assert_eq!(TABLE, [Some(1), Some(2), None, None]);
    }
}
