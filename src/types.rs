use serde::{Deserialize, Serialize};

/// A pixel position in a grid. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Width and height of an image or grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned integer rectangle defined by its top-left corner, width, and height.
///
/// The right and bottom edges are exclusive: a rectangle at `x = 2` with
/// `width = 3` covers columns 2, 3 and 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rectangle {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its edges. A right/bottom edge before the
    /// left/top edge yields an empty rectangle.
    pub fn from_ltrb(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    /// The rectangle covering a whole area of the given size.
    pub const fn covering(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub const fn left(&self) -> usize {
        self.x
    }

    pub const fn top(&self) -> usize {
        self.y
    }

    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.left()
            && position.x < self.right()
            && position.y >= self.top()
            && position.y < self.bottom()
    }

    /// True if the position lies on the outermost ring of this rectangle.
    pub fn is_on_edge(&self, position: Position) -> bool {
        self.contains(position)
            && (position.x == self.left()
                || position.x + 1 == self.right()
                || position.y == self.top()
                || position.y + 1 == self.bottom())
    }

    /// True if the rectangle lies entirely within an area of the given size.
    pub fn fits_within(&self, size: Size) -> bool {
        self.right() <= size.width && self.bottom() <= size.height
    }

    /// The overlapping part of two rectangles; empty when they do not overlap.
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rectangle::new(left.min(right), top.min(bottom), 0, 0);
        }
        Rectangle::from_ltrb(left, top, right, bottom)
    }

    /// Grow every side outwards by `dx` (left and right) and `dy` (top and
    /// bottom), then clip the result to an area of the given size.
    pub fn inflate_within(&self, dx: i64, dy: i64, limits: Size) -> Rectangle {
        let left = (self.left() as i64 - dx).clamp(0, limits.width as i64);
        let top = (self.top() as i64 - dy).clamp(0, limits.height as i64);
        let right = (self.right() as i64 + dx).clamp(0, limits.width as i64);
        let bottom = (self.bottom() as i64 + dy).clamp(0, limits.height as i64);
        Rectangle::from_ltrb(left as usize, top as usize, right as usize, bottom as usize)
    }

    /// Ratio of the longest side to the shortest side. `None` for empty rectangles.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let longest = self.width.max(self.height) as f64;
        let shortest = self.width.min(self.height) as f64;
        Some(longest / shortest)
    }
}

/// A colour sample with one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(intensity: u8) -> Self {
        Self::new(intensity, intensity, intensity)
    }

    pub fn to_greyscale(&self) -> f64 {
        0.2989 * self.r as f64 + 0.5870 * self.g as f64 + 0.1140 * self.b as f64
    }

    pub fn min_channel(&self) -> u8 {
        self.r.min(self.g).min(self.b)
    }
}
