//! Connected-component extraction over a skin mask.
//!
//! Skin pixels are grouped into 4-connected components. A component only counts
//! as a face candidate if it fully encloses a non-trivial hole (eyes, mouth):
//! the skin blob shape alone is not enough.

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::types::{Position, Rectangle};

/// Components smaller than `MIN_COMPONENT_PIXELS_PER_SCALE * scale` pixels are noise.
pub const MIN_COMPONENT_PIXELS_PER_SCALE: usize = 64;

/// A 4-connected set of positions sharing the same mask value.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub positions: Vec<Position>,
    pub bounds: Rectangle,
}

impl Component {
    fn from_positions(positions: Vec<Position>) -> Self {
        let bounds = bounding_rectangle(&positions);
        Self { positions, bounds }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn touches_edge_of(&self, area: &Rectangle) -> bool {
        self.positions.iter().any(|p| area.is_on_edge(*p))
    }
}

/// Tight bounding rectangle of a non-empty set of positions.
fn bounding_rectangle(positions: &[Position]) -> Rectangle {
    let mut left = usize::MAX;
    let mut top = usize::MAX;
    let mut right = 0;
    let mut bottom = 0;
    for p in positions {
        left = left.min(p.x);
        top = top.min(p.y);
        right = right.max(p.x);
        bottom = bottom.max(p.y);
    }
    Rectangle::from_ltrb(left, top, right + 1, bottom + 1)
}

/// Flood fill from `start`, collecting every position 4-connected to it that
/// has the same mask value and lies within `limit_to`.
///
/// Uses an explicit stack so large regions cannot exhaust the call stack.
pub fn flood_fill(mask: &Grid<bool>, start: Position, limit_to: Rectangle) -> Result<Vec<Position>> {
    if !limit_to.fits_within(mask.size()) {
        return Err(Error::RectangleOutOfBounds {
            x: limit_to.x,
            y: limit_to.y,
            width: limit_to.width,
            height: limit_to.height,
            limit_width: mask.width(),
            limit_height: mask.height(),
        });
    }
    if !limit_to.contains(start) {
        return Err(Error::InvalidArgument(format!(
            "flood fill start ({}, {}) lies outside {:?}",
            start.x, start.y, limit_to
        )));
    }

    let target = mask[start];
    let mut filled = vec![false; limit_to.area()];
    let local_index = |p: Position| (p.y - limit_to.top()) * limit_to.width + (p.x - limit_to.left());

    let mut stack = vec![start];
    filled[local_index(start)] = true;
    let mut region = Vec::new();

    while let Some(current) = stack.pop() {
        region.push(current);

        let neighbours = [
            (current.x.checked_sub(1), Some(current.y)),
            (Some(current.x + 1), Some(current.y)),
            (Some(current.x), current.y.checked_sub(1)),
            (Some(current.x), Some(current.y + 1)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let next = Position::new(nx, ny);
            if !limit_to.contains(next) {
                continue;
            }
            let index = local_index(next);
            if !filled[index] && mask[next] == target {
                filled[index] = true;
                stack.push(next);
            }
        }
    }

    Ok(region)
}

/// Split every position inside `limit_to` whose mask value equals `value` into
/// connected components, in row-major order of each component's first position.
pub fn components(mask: &Grid<bool>, value: bool, limit_to: Rectangle) -> Result<Vec<Component>> {
    if !limit_to.fits_within(mask.size()) {
        return Err(Error::RectangleOutOfBounds {
            x: limit_to.x,
            y: limit_to.y,
            width: limit_to.width,
            height: limit_to.height,
            limit_width: mask.width(),
            limit_height: mask.height(),
        });
    }

    let mut assigned = vec![false; limit_to.area()];
    let mut found = Vec::new();
    for y in limit_to.top()..limit_to.bottom() {
        for x in limit_to.left()..limit_to.right() {
            let position = Position::new(x, y);
            let index = (y - limit_to.top()) * limit_to.width + (x - limit_to.left());
            if assigned[index] || mask[position] != value {
                continue;
            }
            let positions = flood_fill(mask, position, limit_to)?;
            for p in &positions {
                assigned[(p.y - limit_to.top()) * limit_to.width + (p.x - limit_to.left())] = true;
            }
            found.push(Component::from_positions(positions));
        }
    }
    Ok(found)
}

/// All skin components large enough to be worth considering.
pub fn skin_objects(mask: &Grid<bool>, scale: usize) -> Result<Vec<Component>> {
    let min_pixels = MIN_COMPONENT_PIXELS_PER_SCALE * scale;
    Ok(components(mask, true, mask.bounds())?
        .into_iter()
        .filter(|component| component.len() >= min_pixels)
        .collect())
}

/// True if the bounding rectangle of `object` contains a non-skin region that
/// touches none of its edges and is larger than `scale` pixels.
pub fn has_enclosed_hole(mask: &Grid<bool>, object: &Component, scale: usize) -> Result<bool> {
    let holes = components(mask, false, object.bounds)?;
    Ok(holes
        .iter()
        .any(|hole| !hole.touches_edge_of(&object.bounds) && hole.len() > scale))
}

/// Bounding rectangles of the skin objects that enclose at least one hole.
pub fn identify_face_regions(mask: &Grid<bool>, scale: usize) -> Result<Vec<Rectangle>> {
    let mut regions = Vec::new();
    for object in skin_objects(mask, scale)? {
        if has_enclosed_hole(mask, &object, scale)? {
            regions.push(object.bounds);
        }
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a mask from rows of `#` (true) and `.` (false).
    fn mask_from(rows: &[&str]) -> Grid<bool> {
        let height = rows.len();
        let width = rows[0].len();
        Grid::from_fn(width, height, |p| rows[p.y].as_bytes()[p.x] == b'#').unwrap()
    }

    #[test]
    fn flood_fill_uses_four_connectivity() {
        let mask = mask_from(&[
            "##..", //
            "##..", //
            "..##", //
            "..##", //
        ]);
        let region = flood_fill(&mask, Position::new(0, 0), mask.bounds()).unwrap();
        assert_eq!(region.len(), 4);
        assert!(region.iter().all(|p| p.x < 2 && p.y < 2));
    }

    #[test]
    fn flood_fill_respects_limit() {
        let mask = mask_from(&["######"]);
        let region = flood_fill(&mask, Position::new(1, 0), Rectangle::new(0, 0, 3, 1)).unwrap();
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn flood_fill_rejects_bad_arguments() {
        let mask = mask_from(&["###", "###"]);
        assert!(flood_fill(&mask, Position::new(0, 0), Rectangle::new(0, 0, 4, 2)).is_err());
        assert!(flood_fill(&mask, Position::new(2, 1), Rectangle::new(0, 0, 2, 2)).is_err());
    }

    #[test]
    fn flood_fill_handles_large_regions_without_recursion() {
        let mask = Grid::new(600, 600, vec![true; 360_000]).unwrap();
        let region = flood_fill(&mask, Position::new(300, 300), mask.bounds()).unwrap();
        assert_eq!(region.len(), 360_000);
    }

    #[test]
    fn components_are_found_in_row_major_order() {
        let mask = mask_from(&[
            "#..#", //
            "#..#", //
            "....", //
            ".##.", //
        ]);
        let found = components(&mask, true, mask.bounds()).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].bounds, Rectangle::new(0, 0, 1, 2));
        assert_eq!(found[1].bounds, Rectangle::new(3, 0, 1, 2));
        assert_eq!(found[2].bounds, Rectangle::new(1, 3, 2, 1));
    }

    #[test]
    fn small_objects_are_discarded() {
        let mask = mask_from(&[
            "########..", //
            "########..", //
            "########..", //
            "########..", //
            "########..", //
            "########..", //
            "########..", //
            "########.#", //
        ]);
        let objects = skin_objects(&mask, 1).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].len(), 64);
    }

    #[test]
    fn enclosed_hole_confirms_region() {
        // 12x12 block of skin with a 3x3 hole in the middle
        let mask = Grid::from_fn(16, 16, |p| {
            let in_block = (2..14).contains(&p.x) && (2..14).contains(&p.y);
            let in_hole = (6..9).contains(&p.x) && (6..9).contains(&p.y);
            in_block && !in_hole
        })
        .unwrap();
        let regions = identify_face_regions(&mask, 1).unwrap();
        assert_eq!(regions, vec![Rectangle::new(2, 2, 12, 12)]);
    }

    #[test]
    fn hole_touching_edge_is_ignored() {
        // Same block, but the "hole" is a notch cut in from the top edge
        let mask = Grid::from_fn(16, 16, |p| {
            let in_block = (2..14).contains(&p.x) && (2..14).contains(&p.y);
            let in_notch = (6..9).contains(&p.x) && (2..7).contains(&p.y);
            in_block && !in_notch
        })
        .unwrap();
        let regions = identify_face_regions(&mask, 1).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn hole_must_be_larger_than_scale() {
        let mask = Grid::from_fn(16, 16, |p| {
            let in_block = (2..14).contains(&p.x) && (2..14).contains(&p.y);
            let in_hole = (6..8).contains(&p.x) && p.y == 6;
            in_block && !in_hole
        })
        .unwrap();
        // Hole of two pixels: enough at scale 1, not at scale 2
        assert_eq!(identify_face_regions(&mask, 1).unwrap().len(), 1);
        assert!(identify_face_regions(&mask, 2).unwrap().is_empty());
    }

    #[test]
    fn empty_mask_has_no_regions() {
        let mask = Grid::new(8, 8, vec![false; 64]).unwrap();
        assert!(identify_face_regions(&mask, 1).unwrap().is_empty());
    }
}
