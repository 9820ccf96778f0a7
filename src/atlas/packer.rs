use std::cmp::Reverse;

use crate::error::{ResourceError, Result};
use crate::geometry::IntRect;

// ── Placements ───────────────────────────────────────────────────────────────

/// One texture's position inside the packed atlas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedRect {
    pub name: String,
    /// Top-left pixel coordinate inside the atlas.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlacedRect {
    pub fn rect(&self) -> IntRect {
        IntRect::new(self.x as i32, self.y as i32, self.width as i32, self.height as i32)
    }
}

/// Result of a successful [`pack`].
#[derive(Clone, Debug, PartialEq)]
pub struct Packing {
    /// One placement per input item, in input order.
    pub placements: Vec<PlacedRect>,
    /// Bounding box of all placements.
    pub width: u32,
    pub height: u32,
}

// ── Free space tracking ──────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct Space {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// Free rectangles of a bin. Every insertion consumes one free rectangle and
/// splits the leftover into at most two new ones, so spaces never overlap.
struct EmptySpaces {
    spaces: Vec<Space>,
}

impl EmptySpaces {
    fn new(w: u32, h: u32) -> Self {
        Self { spaces: vec![Space { x: 0, y: 0, w, h }] }
    }

    /// Place a `w × h` rectangle in the most recently created space that
    /// can hold it.
    fn insert(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        let index = (0..self.spaces.len())
            .rev()
            .find(|&i| w <= self.spaces[i].w && h <= self.spaces[i].h)?;
        let space = self.spaces.swap_remove(index);
        self.split(space, w, h);
        Some((space.x, space.y))
    }

    // The smaller leftover is pushed last so the reverse scan tries it first.
    fn split(&mut self, s: Space, w: u32, h: u32) {
        let free_w = s.w - w;
        let free_h = s.h - h;
        match (free_w, free_h) {
            (0, 0) => {}
            (0, _) => self.spaces.push(Space { x: s.x, y: s.y + h, w: s.w, h: free_h }),
            (_, 0) => self.spaces.push(Space { x: s.x + w, y: s.y, w: free_w, h: s.h }),
            _ if free_w > free_h => {
                self.spaces.push(Space { x: s.x + w, y: s.y, w: free_w, h: s.h });
                self.spaces.push(Space { x: s.x, y: s.y + h, w, h: free_h });
            }
            _ => {
                self.spaces.push(Space { x: s.x, y: s.y + h, w: s.w, h: free_h });
                self.spaces.push(Space { x: s.x + w, y: s.y, w: free_w, h });
            }
        }
    }
}

// ── Orderings ────────────────────────────────────────────────────────────────

type SortKey = fn(u32, u32) -> u64;

/// Insertion orders tried by [`pack`], all largest first.
const ORDERINGS: [(&str, SortKey); 6] = [
    ("area", |w, h| w as u64 * h as u64),
    ("perimeter", |w, h| 2 * (w as u64 + h as u64)),
    ("max side", |w, h| w.max(h) as u64),
    ("width", |w, _| w as u64),
    ("height", |_, h| h as u64),
    ("pathological", |w, h| {
        let (long, short) = (w.max(h) as u64, w.min(h).max(1) as u64);
        long / short * w as u64 * h as u64
    }),
];

/// Positions by item index, or `None` if something did not fit.
fn try_pack(items: &[(String, u32, u32)], order: &[usize], w: u32, h: u32) -> Option<Vec<(u32, u32)>> {
    let mut spaces = EmptySpaces::new(w, h);
    let mut positions = vec![(0, 0); items.len()];
    for &i in order {
        let (_, iw, ih) = items[i];
        if iw == 0 || ih == 0 {
            continue;
        }
        positions[i] = spaces.insert(iw, ih)?;
    }
    Some(positions)
}

/// Smallest bin found for one insertion order.
///
/// Binary search over square bins between 0 and `max_side`, stopping once the
/// bracket is no wider than `|discard_step|`. A negative step then shrinks
/// width and height on their own.
fn best_for_order(
    items: &[(String, u32, u32)],
    order: &[usize],
    max_side: u32,
    discard_step: i32,
) -> Option<Vec<(u32, u32)>> {
    let threshold = discard_step.unsigned_abs().max(1);
    let mut best = try_pack(items, order, max_side, max_side)?;

    let (mut lo, mut side) = (0, max_side);
    while side - lo > threshold {
        let mid = lo + (side - lo) / 2;
        match try_pack(items, order, mid, mid) {
            Some(positions) => {
                side = mid;
                best = positions;
            }
            None => lo = mid,
        }
    }

    if discard_step < 0 {
        let (mut width, mut height) = (side, side);
        let mut lo = 0;
        while width - lo > threshold {
            let mid = lo + (width - lo) / 2;
            match try_pack(items, order, mid, height) {
                Some(positions) => {
                    width = mid;
                    best = positions;
                }
                None => lo = mid,
            }
        }
        let mut lo = 0;
        while height - lo > threshold {
            let mid = lo + (height - lo) / 2;
            match try_pack(items, order, width, mid) {
                Some(positions) => {
                    height = mid;
                    best = positions;
                }
                None => lo = mid,
            }
        }
    }
    Some(best)
}

fn extent(items: &[(String, u32, u32)], positions: &[(u32, u32)]) -> (u32, u32) {
    items
        .iter()
        .zip(positions)
        .filter(|((_, w, h), _)| *w > 0 && *h > 0)
        .fold((0, 0), |(ew, eh), ((_, w, h), (x, y))| (ew.max(x + w), eh.max(y + h)))
}

// ── pack ─────────────────────────────────────────────────────────────────────

/// Pack `(name, width, height)` items into one bin no larger than
/// `max_side × max_side`.
///
/// Each of the six orderings is searched for its smallest bin and the
/// ordering with the smallest bounding area wins (earlier orderings win
/// ties). Either every item is placed or [`ResourceError::AtlasOverflow`] is
/// returned. Zero-area items are reported at `(0, 0)` and take no space.
pub fn pack(items: &[(String, u32, u32)], max_side: u32, discard_step: i32) -> Result<Packing> {
    let overflow = || ResourceError::AtlasOverflow { count: items.len(), max_side };

    if let Some((name, w, h)) = items.iter().find(|(_, w, h)| *w > max_side || *h > max_side) {
        log::warn!("packer: '{name}' ({w}x{h}) is larger than the {max_side}px atlas");
        return Err(overflow());
    }

    let mut best: Option<(u64, &str, Vec<(u32, u32)>)> = None;
    for (label, key) in ORDERINGS {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by_key(|&i| Reverse(key(items[i].1, items[i].2)));

        let Some(positions) = best_for_order(items, &order, max_side, discard_step) else {
            continue;
        };
        let (w, h) = extent(items, &positions);
        let area = w as u64 * h as u64;
        if best.as_ref().is_none_or(|(best_area, _, _)| area < *best_area) {
            best = Some((area, label, positions));
        }
    }

    let (_, label, positions) = best.ok_or_else(overflow)?;
    let (width, height) = extent(items, &positions);
    log::debug!("packer: {} rects into {width}x{height} using '{label}' ordering", items.len());

    let placements = items
        .iter()
        .zip(positions)
        .map(|((name, w, h), (x, y))| PlacedRect { name: name.clone(), x, y, width: *w, height: *h })
        .collect();
    Ok(Packing { placements, width, height })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
