use glam::IVec2;

use super::{ConnectedTexture, Neighbours, TileGrid, mapping_table};
use crate::error::Result;
use crate::geometry::IntRect;
use crate::resources::Relocatable;

const TILES_PER_SIDE: u32 = 4;

// Fence-local weights: only the orthogonal neighbours count.
const NORTH: u8 = 1;
const EAST: u8 = 2;
const SOUTH: u8 = 4;
const WEST: u8 = 8;

#[rustfmt::skip]
const GRID_VALUES: [u8; 16] = [
     0,  2, 10,  8,
     4,  6, 14, 12,
     5,  7, 15, 13,
     1,  3, 11,  9,
];

const MAPPING: [Option<u8>; 16] = mapping_table(&GRID_VALUES);

/// 16-tile fence (Wang) layout driven by the four orthogonal neighbours.
#[derive(Clone, Debug, PartialEq)]
pub struct FenceTexture {
    grid: TileGrid,
}

impl FenceTexture {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self { grid: TileGrid::new(width, height, TILES_PER_SIDE)? })
    }
}

impl ConnectedTexture for FenceTexture {
    fn neighbours_to_int(&self, n: Neighbours) -> u8 {
        [(n.north(), NORTH), (n.east(), EAST), (n.south(), SOUTH), (n.west(), WEST)]
            .into_iter()
            .filter(|&(set, _)| set)
            .fold(0, |value, (_, weight)| value | weight)
    }

    fn rect_for_value(&self, value: u8) -> Option<IntRect> {
        MAPPING
            .get(value as usize)
            .copied()
            .flatten()
            .and_then(|index| self.grid.get(index as usize))
    }

    fn get_all_neighbours(&self) -> u8 {
        NORTH | EAST | SOUTH | WEST
    }

    fn grid(&self) -> &TileGrid {
        &self.grid
    }

    fn kind(&self) -> &'static str {
        "fence"
    }
}

impl Relocatable for FenceTexture {
    fn origin(&self) -> IVec2 {
        self.grid.origin()
    }

    fn move_to(&mut self, position: IVec2) {
        self.grid.move_to(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonals_are_ignored() {
        let tex = FenceTexture::new(64, 64).unwrap();
        let diagonals = Neighbours::NORTH_EAST | Neighbours::SOUTH_EAST | Neighbours::SOUTH_WEST | Neighbours::NORTH_WEST;
        assert_eq!(tex.neighbours_to_int(diagonals), 0);
        assert_eq!(tex.neighbours_to_int(Neighbours::all()), 15);
    }

    #[test]
    fn north_and_south_is_vertical_bar() {
        let tex = FenceTexture::new(64, 64).unwrap();
        // 1 + 4 = 5 sits at row 2, column 0.
        assert_eq!(
            tex.get_rect(Neighbours::NORTH | Neighbours::SOUTH),
            Some(IntRect::new(0, 32, 16, 16))
        );
    }

    #[test]
    fn out_of_range_value_has_no_tile() {
        let tex = FenceTexture::new(64, 64).unwrap();
        assert_eq!(tex.rect_for_value(16), None);
    }
}
