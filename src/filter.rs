//! Candidate region filtering, padding and rescaling.

use crate::error::{Error, Result};
use crate::types::{Rectangle, Size};

/// Regions whose longest side exceeds this multiple of the shortest side are rejected.
pub const MAX_ASPECT_RATIO: f64 = 2.4;

/// A region is redundant if another region is more than this many times larger...
pub const REDUNDANT_AREA_MULTIPLE: f64 = 2.0;
/// ...and covers more than this fraction of it.
pub const REDUNDANT_OVERLAP_FRACTION: f64 = 0.4;

pub type RegionFilter = fn(&[Rectangle]) -> Result<Vec<Rectangle>>;

/// Drop long, narrow regions and regions made redundant by a much larger
/// overlapping region.
pub fn aspect_ratio_filter(areas: &[Rectangle]) -> Result<Vec<Rectangle>> {
    let mut allowed = Vec::with_capacity(areas.len());
    for area in areas {
        let ratio = area.aspect_ratio().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "region {:?} must have positive width and height",
                area
            ))
        })?;
        if ratio <= MAX_ASPECT_RATIO {
            allowed.push(*area);
        }
    }
    Ok(remove_redundant(&allowed))
}

/// Remove every region that a much larger region overlaps substantially. All
/// comparisons are made against the input set, so the result does not depend
/// on the order of removal.
pub fn remove_redundant(areas: &[Rectangle]) -> Vec<Rectangle> {
    areas
        .iter()
        .filter(|area| {
            let own_area = area.area() as f64;
            !areas.iter().any(|other| {
                other.area() as f64 > own_area * REDUNDANT_AREA_MULTIPLE
                    && other.intersect(area).area() as f64 > own_area * REDUNDANT_OVERLAP_FRACTION
            })
        })
        .copied()
        .collect()
}

/// Pad `area` by `percentage_to_add` of its width on the left and right and of
/// its height on the top and bottom, clipped to the image.
pub fn expand_rectangle(area: Rectangle, percentage_to_add: f64, image_size: Size) -> Result<Rectangle> {
    if image_size.width == 0 || image_size.height == 0 {
        return Err(Error::InvalidArgument(format!(
            "image size must be positive, got {}x{}",
            image_size.width, image_size.height
        )));
    }
    if !area.fits_within(image_size) {
        return Err(out_of_bounds(area, image_size));
    }
    if !percentage_to_add.is_finite() || percentage_to_add < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "expansion percentage must be a non-negative number, got {}",
            percentage_to_add
        )));
    }

    let dx = (area.width as f64 * percentage_to_add).round_ties_even() as i64;
    let dy = (area.height as f64 * percentage_to_add).round_ties_even() as i64;
    Ok(area.inflate_within(dx, dy, image_size))
}

/// Map a region found on a downscaled image back onto the original image,
/// clipping any rounding overshoot to `limits`.
pub fn scale_rectangle(region: Rectangle, scale: f64, limits: Size) -> Result<Rectangle> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "scale must be positive, got {}",
            scale
        )));
    }
    if limits.width == 0 || limits.height == 0 {
        return Err(Error::InvalidArgument(format!(
            "limits must be positive, got {}x{}",
            limits.width, limits.height
        )));
    }

    let scaled = |value: usize| (value as f64 * scale).round_ties_even() as usize;
    let left = scaled(region.x).min(limits.width);
    let top = scaled(region.y).min(limits.height);
    let right = (left + scaled(region.width)).min(limits.width);
    let bottom = (top + scaled(region.height)).min(limits.height);
    Ok(Rectangle::from_ltrb(left, top, right, bottom))
}

fn out_of_bounds(area: Rectangle, limits: Size) -> Error {
    Error::RectangleOutOfBounds {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height,
        limit_width: limits.width,
        limit_height: limits.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_long_narrow_regions() {
        let tall = Rectangle::new(0, 0, 10, 30);
        let fine = Rectangle::new(50, 50, 10, 20);
        let kept = aspect_ratio_filter(&[tall, fine]).unwrap();
        assert_eq!(kept, vec![fine]);
    }

    #[test]
    fn ratio_at_limit_is_kept() {
        let edge = Rectangle::new(0, 0, 10, 24);
        assert_eq!(aspect_ratio_filter(&[edge]).unwrap(), vec![edge]);
    }

    #[test]
    fn empty_regions_are_invalid() {
        assert!(aspect_ratio_filter(&[Rectangle::new(0, 0, 0, 5)]).is_err());
    }

    #[test]
    fn small_region_inside_large_one_is_redundant() {
        let large = Rectangle::new(0, 0, 40, 40);
        let nested = Rectangle::new(10, 10, 10, 10);
        let separate = Rectangle::new(100, 100, 10, 10);
        let kept = aspect_ratio_filter(&[nested, large, separate]).unwrap();
        assert_eq!(kept, vec![large, separate]);
    }

    #[test]
    fn similar_sized_overlapping_regions_are_both_kept() {
        let a = Rectangle::new(0, 0, 20, 20);
        let b = Rectangle::new(5, 5, 20, 20);
        assert_eq!(remove_redundant(&[a, b]), vec![a, b]);
    }

    #[test]
    fn slight_overlap_is_not_redundant() {
        let large = Rectangle::new(0, 0, 40, 40);
        // 10x10 region with only a 3x10 strip inside the large one
        let edge = Rectangle::new(37, 10, 10, 10);
        assert_eq!(remove_redundant(&[large, edge]), vec![large, edge]);
    }

    #[test]
    fn expansion_pads_each_side_and_clips() {
        let size = Size::new(100, 100);
        let padded = expand_rectangle(Rectangle::new(20, 20, 40, 20), 0.1, size).unwrap();
        assert_eq!(padded, Rectangle::new(16, 18, 48, 24));

        let clipped = expand_rectangle(Rectangle::new(0, 90, 50, 10), 0.5, size).unwrap();
        assert_eq!(clipped, Rectangle::new(0, 85, 75, 15));
    }

    #[test]
    fn expansion_validates_arguments() {
        let size = Size::new(10, 10);
        assert!(expand_rectangle(Rectangle::new(5, 5, 6, 2), 0.1, size).is_err());
        assert!(expand_rectangle(Rectangle::new(0, 0, 5, 5), -0.1, size).is_err());
        assert!(expand_rectangle(Rectangle::new(0, 0, 5, 5), 0.1, Size::new(0, 10)).is_err());
    }

    #[test]
    fn scaling_up_clips_to_original_image() {
        let limits = Size::new(250, 250);
        let scaled = scale_rectangle(Rectangle::new(10, 20, 30, 40), 1.25, limits).unwrap();
        assert_eq!(scaled, Rectangle::new(12, 25, 38, 50));

        let overshoot = scale_rectangle(Rectangle::new(150, 150, 50, 50), 1.26, limits).unwrap();
        assert_eq!(overshoot.right(), 250);
        assert_eq!(overshoot.bottom(), 250);
    }

    #[test]
    fn scaling_rejects_non_positive_scale() {
        assert!(scale_rectangle(Rectangle::new(0, 0, 1, 1), 0.0, Size::new(5, 5)).is_err());
    }
}
