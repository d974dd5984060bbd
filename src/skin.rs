//! Skin mask construction.
//!
//! 1. A strict hue/saturation/texture filter seeds the mask.
//! 2. A fixed number of relaxed expansions grow it into neighbouring pixels that
//!    pass a looser hue/saturation filter. Each expansion reads only the mask
//!    produced by the previous one, so growth is one pixel ring per pass.
//! 3. The mask is confirmed against a greyscale intensity band.

use crate::colour::HueSaturation;
use crate::error::Result;
use crate::grid::Grid;
use crate::types::Rgb;

/// Greyscale intensity band (inclusive) a skin pixel must fall into.
pub const MIN_SKIN_INTENSITY: f64 = 90.0;
pub const MAX_SKIN_INTENSITY: f64 = 240.0;

pub type StrictSkinFilter = fn(&HueSaturation) -> bool;
pub type RelaxedSkinFilter = fn(&HueSaturation) -> bool;

pub fn initial_mask(hues: &Grid<HueSaturation>, strict_filter: StrictSkinFilter) -> Grid<bool> {
    hues.transform(strict_filter)
}

/// One relaxed expansion pass: an unmasked pixel joins the mask if it passes
/// `relaxed_filter` and any pixel in its 3x3 neighbourhood is already masked.
pub fn expand_mask(
    mask: &Grid<bool>,
    hues: &Grid<HueSaturation>,
    relaxed_filter: RelaxedSkinFilter,
) -> Result<Grid<bool>> {
    mask.combine_with_position(hues, |is_skin, hue, position| {
        if *is_skin {
            return true;
        }
        if !relaxed_filter(hue) {
            return false;
        }
        let surrounding = mask.rectangle_around(position, 1, 1);
        mask.any_values_match(surrounding, |adjacent| *adjacent)
    })
}

/// Keep only masked pixels whose greyscale intensity lies within the skin band.
pub fn confirm_intensity(colours: &Grid<Rgb>, mask: &Grid<bool>) -> Result<Grid<bool>> {
    colours.combine_with(mask, |colour, is_skin| {
        if !*is_skin {
            return false;
        }
        let intensity = colour.to_greyscale();
        (MIN_SKIN_INTENSITY..=MAX_SKIN_INTENSITY).contains(&intensity)
    })
}

/// Every stage of the mask, in order. Kept together so that progress previews
/// can be written without recomputing anything.
#[derive(Debug, Clone)]
pub struct SkinMaskStages {
    pub initial: Grid<bool>,
    pub expanded: Grid<bool>,
    pub confirmed: Grid<bool>,
}

pub fn build_skin_mask(
    colours: &Grid<Rgb>,
    hues: &Grid<HueSaturation>,
    strict_filter: StrictSkinFilter,
    relaxed_filter: RelaxedSkinFilter,
    relaxed_expansions: usize,
) -> Result<SkinMaskStages> {
    let initial = initial_mask(hues, strict_filter);
    let mut expanded = initial.clone();
    for _ in 0..relaxed_expansions {
        expanded = expand_mask(&expanded, hues, relaxed_filter)?;
    }
    let confirmed = confirm_intensity(colours, &expanded)?;
    Ok(SkinMaskStages {
        initial,
        expanded,
        confirmed,
    })
}
