// =============================================================================
// GEOMETRY.RS: Rectangles and compass directions for the resource pipeline
//
// - IntRect: pixel rectangles inside source images and the texture atlas
// - Aabb: world-unit rectangles (object footprints)
// - Direction table shared by the autotiling bitmask
// =============================================================================

use glam::{IVec2, Vec2};
use serde::Deserialize;

// =============================================================================
// PIXEL RECTANGLES
// =============================================================================

/// Axis-aligned pixel rectangle, top-left origin, Y pointing down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, width, height }
    }

    /// Rectangle anchored at the origin with the given size.
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        IVec2::new(self.left, self.top)
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// True when the two rectangles share a region of positive area.
    /// Touching edges and empty rectangles never intersect.
    pub fn intersects(&self, other: &IntRect) -> bool {
        if self.area() == 0 || other.area() == 0 {
            return false;
        }
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// True when `other` lies completely inside `self`.
    pub fn contains_rect(&self, other: &IntRect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Same size, shifted by `offset`.
    #[inline]
    pub fn translated(&self, offset: IVec2) -> IntRect {
        IntRect::new(self.left + offset.x, self.top + offset.y, self.width, self.height)
    }

    /// Same size, top-left corner moved to `position`.
    #[inline]
    pub fn moved_to(&self, position: IVec2) -> IntRect {
        IntRect::new(position.x, position.y, self.width, self.height)
    }
}

// =============================================================================
// WORLD RECTANGLES
// =============================================================================

/// Axis-aligned bounding box in world units. Used for collision footprints.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub dimensions: Vec2,
}

impl Aabb {
    pub fn new(position: Vec2, dimensions: Vec2) -> Self {
        Self { position, dimensions }
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.dimensions / 2.0
    }
}

/// `{ "x": .., "y": .. }` as written in side-car files.
#[derive(Copy, Clone, Debug, Deserialize)]
pub(crate) struct PointFile {
    pub x: f32,
    pub y: f32,
}

/// `{ "width": .., "height": .. }` as written in side-car files.
#[derive(Copy, Clone, Debug, Deserialize)]
pub(crate) struct DimensionsFile {
    pub width: f32,
    pub height: f32,
}

// =============================================================================
// DIRECTION HELPERS
// =============================================================================

/// All 8 directions as (dx, dy) offsets, in bitmask order.
pub const ALL_DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];
