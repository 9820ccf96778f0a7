use glam::IVec2;

use super::{ConnectedTexture, Neighbours, TileGrid, mapping_table};
use crate::error::Result;
use crate::geometry::IntRect;
use crate::resources::Relocatable;

const TILES_PER_SIDE: u32 = 7;

/// Encoded value of each cell in the 7×7 blob sheet, row by row. The two
/// spare cells repeat 0; the table keeps the last occurrence.
#[rustfmt::skip]
const GRID_VALUES: [u8; 49] = [
      0,   0,   4,  92, 116,  68,  64,
      0,  28, 124, 127, 245,  84,  80,
     16,  31, 255, 247, 221, 125, 113,
     29, 119, 215, 193,   7, 223, 241,
     23, 213,  93, 112,  20,  87, 209,
     17,  21,  95, 253, 117,  85,  81,
      1,   5,  71, 199, 197,  69,  65,
];

const MAPPING: [Option<u8>; 256] = mapping_table(&GRID_VALUES);

/// 47-tile blob layout: all 8 neighbours matter, but a corner only counts
/// when both orthogonal neighbours next to it are connected.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobTexture {
    grid: TileGrid,
}

impl BlobTexture {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self { grid: TileGrid::new(width, height, TILES_PER_SIDE)? })
    }
}

impl ConnectedTexture for BlobTexture {
    fn neighbours_to_int(&self, n: Neighbours) -> u8 {
        let mut value = n & (Neighbours::NORTH | Neighbours::EAST | Neighbours::SOUTH | Neighbours::WEST);
        if n.north_east() && n.north() && n.east() {
            value |= Neighbours::NORTH_EAST;
        }
        if n.south_east() && n.south() && n.east() {
            value |= Neighbours::SOUTH_EAST;
        }
        if n.south_west() && n.south() && n.west() {
            value |= Neighbours::SOUTH_WEST;
        }
        if n.north_west() && n.north() && n.west() {
            value |= Neighbours::NORTH_WEST;
        }
        value.bits()
    }

    fn rect_for_value(&self, value: u8) -> Option<IntRect> {
        MAPPING[value as usize].and_then(|index| self.grid.get(index as usize))
    }

    fn get_all_neighbours(&self) -> u8 {
        255
    }

    fn grid(&self) -> &TileGrid {
        &self.grid
    }

    fn kind(&self) -> &'static str {
        "blob"
    }
}

impl Relocatable for BlobTexture {
    fn origin(&self) -> IVec2 {
        self.grid.origin()
    }

    fn move_to(&mut self, position: IVec2) {
        self.grid.move_to(position);
    }
}
