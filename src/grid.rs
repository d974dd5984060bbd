//! Immutable 2D grid of values.
//!
//! Every pixel transform in the detector runs over a [`Grid`]. Operations never
//! modify a grid in place; each one produces a new grid so that a pipeline stage
//! can hand its output to the next stage and forget about it.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::types::{Position, Rectangle, Size};

/// A `width × height` grid of values stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    values: Vec<T>,
}

impl<T> Grid<T> {
    /// Wrap row-major values. Fails if either dimension is zero or the value
    /// count does not match the dimensions.
    pub fn new(width: usize, height: usize, values: Vec<T>) -> Result<Self> {
        check_dimensions(width, height)?;
        if values.len() != width * height {
            return Err(Error::InvalidArgument(format!(
                "{} values supplied for a {}x{} grid",
                values.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(Position) -> T,
    {
        check_dimensions(width, height)?;
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(Position::new(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The rectangle covering the whole grid.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::covering(self.size())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn get(&self, position: Position) -> Option<&T> {
        if position.x >= self.width || position.y >= self.height {
            return None;
        }
        self.values.get(self.index_of(position))
    }

    #[inline]
    fn index_of(&self, position: Position) -> usize {
        position.y * self.width + position.x
    }

    #[inline]
    fn position_of(&self, index: usize) -> Position {
        Position::new(index % self.width, index / self.width)
    }

    /// Apply `f` to every value, keeping positions.
    pub fn transform<U, F>(&self, f: F) -> Grid<U>
    where
        F: Fn(&T) -> U,
    {
        Grid {
            width: self.width,
            height: self.height,
            values: self.values.iter().map(f).collect(),
        }
    }

    /// Like [`Grid::transform`], but `f` also receives the position of each value.
    pub fn transform_with_position<U, F>(&self, f: F) -> Grid<U>
    where
        F: Fn(&T, Position) -> U,
    {
        Grid {
            width: self.width,
            height: self.height,
            values: self
                .values
                .iter()
                .enumerate()
                .map(|(i, value)| f(value, self.position_of(i)))
                .collect(),
        }
    }

    /// Pairwise combination with another grid of the same dimensions.
    pub fn combine_with<U, V, F>(&self, other: &Grid<U>, f: F) -> Result<Grid<V>>
    where
        F: Fn(&T, &U) -> V,
    {
        self.combine_with_position(other, |a, b, _| f(a, b))
    }

    /// Pairwise combination that also passes the position of each pair to `f`.
    pub fn combine_with_position<U, V, F>(&self, other: &Grid<U>, f: F) -> Result<Grid<V>>
    where
        F: Fn(&T, &U, Position) -> V,
    {
        if self.size() != other.size() {
            return Err(Error::SizeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: other.width,
                actual_height: other.height,
            });
        }
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .enumerate()
            .map(|(i, (a, b))| f(a, b, self.position_of(i)))
            .collect();
        Ok(Grid {
            width: self.width,
            height: self.height,
            values,
        })
    }

    /// Median of `extract` over the square window of the given radius around
    /// every position. Windows are clipped at the grid edges, so boundary
    /// positions take the median of fewer values. An even-sized window uses
    /// the mean of its two middle values.
    pub fn median_filter<F>(&self, extract: F, radius: usize) -> Grid<f64>
    where
        F: Fn(&T) -> f64,
    {
        let samples: Vec<f64> = self.values.iter().map(extract).collect();
        if radius == 0 {
            return Grid {
                width: self.width,
                height: self.height,
                values: samples,
            };
        }

        let width = self.width;
        let height = self.height;
        let rows: Vec<Vec<f64>> = (0..height)
            .into_par_iter()
            .map(|y| {
                let top = y.saturating_sub(radius);
                let bottom = (y + radius + 1).min(height);
                let mut window = Vec::with_capacity((2 * radius + 1) * (2 * radius + 1));
                let mut row = Vec::with_capacity(width);
                for x in 0..width {
                    let left = x.saturating_sub(radius);
                    let right = (x + radius + 1).min(width);
                    window.clear();
                    for wy in top..bottom {
                        window.extend_from_slice(&samples[wy * width + left..wy * width + right]);
                    }
                    row.push(median_of(&mut window));
                }
                row
            })
            .collect();

        Grid {
            width,
            height,
            values: rows.into_iter().flatten().collect(),
        }
    }

    /// All `(position, value)` pairs in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, value)| (self.position_of(i), value))
    }

    /// The `(position, value)` pairs accepted by `predicate`, in row-major order.
    pub fn enumerate_where<'a, P>(
        &'a self,
        predicate: P,
    ) -> impl Iterator<Item = (Position, &'a T)> + 'a
    where
        P: Fn(Position, &T) -> bool + 'a,
    {
        self.enumerate()
            .filter(move |(position, value)| predicate(*position, *value))
    }

    /// The rectangle reaching `expand_left_up` positions left of and above
    /// `position` and `expand_right_down` positions right of and below it,
    /// clipped to the grid.
    pub fn rectangle_around(
        &self,
        position: Position,
        expand_left_up: usize,
        expand_right_down: usize,
    ) -> Rectangle {
        let left = position.x.saturating_sub(expand_left_up);
        let top = position.y.saturating_sub(expand_left_up);
        let right = (position.x + expand_right_down + 1).min(self.width);
        let bottom = (position.y + expand_right_down + 1).min(self.height);
        Rectangle::from_ltrb(left, top, right, bottom)
    }

    /// True if any value inside `region` (clipped to the grid) satisfies `predicate`.
    pub fn any_values_match<P>(&self, region: Rectangle, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        let region = region.intersect(&self.bounds());
        (region.top()..region.bottom()).any(|y| {
            let row = y * self.width;
            self.values[row + region.left()..row + region.right()]
                .iter()
                .any(&predicate)
        })
    }

    /// Copy out the values inside `region`, which must lie within the grid.
    pub fn window(&self, region: Rectangle) -> Result<Grid<T>>
    where
        T: Clone,
    {
        if region.is_empty() || !region.fits_within(self.size()) {
            return Err(Error::RectangleOutOfBounds {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                limit_width: self.width,
                limit_height: self.height,
            });
        }
        let mut values = Vec::with_capacity(region.area());
        for y in region.top()..region.bottom() {
            let row = y * self.width;
            values.extend_from_slice(&self.values[row + region.left()..row + region.right()]);
        }
        Ok(Grid {
            width: region.width,
            height: region.height,
            values,
        })
    }
}

impl<T> std::ops::Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, position: Position) -> &Self::Output {
        assert!(
            position.x < self.width && position.y < self.height,
            "position ({}, {}) out of bounds for {}x{} grid",
            position.x,
            position.y,
            self.width,
            self.height
        );
        &self.values[self.index_of(position)]
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidArgument(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// Median of a non-empty window. Reorders the window.
fn median_of(window: &mut [f64]) -> f64 {
    let len = window.len();
    let mid = len / 2;
    let (lower, upper, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    let upper = *upper;
    if len % 2 == 1 {
        return upper;
    }
    let lower_max = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lower_max + upper) / 2.0
}
