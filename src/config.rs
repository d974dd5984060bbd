//! Detection policy.
//!
//! Every tunable of the skin-tone detector lives in [`DetectorConfig`]. Policy
//! items that are decisions rather than numbers (skin filters, the scale
//! calculation, the region filter) are plain function pointers so a caller can
//! swap one out without implementing a trait.

use crate::colour::{HueSaturation, SmoothingRadii};
use crate::error::{Error, Result};
use crate::filter::{aspect_ratio_filter, RegionFilter};
use crate::skin::{RelaxedSkinFilter, StrictSkinFilter};

pub type ScaleCalculator = fn(usize, usize) -> usize;

#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Images with either side longer than this are downscaled first.
    pub maximum_image_dimension: usize,
    /// Smoothing scale for an image of the given width and height.
    pub calculate_scale: ScaleCalculator,
    pub texture_amplitude_first_pass_multiplier: usize,
    pub texture_amplitude_second_pass_multiplier: usize,
    pub rg_by_smoothen_multiplier: usize,
    pub strict_skin_filter: StrictSkinFilter,
    pub relaxed_skin_filter: RelaxedSkinFilter,
    pub number_of_relaxed_expansions: usize,
    pub aspect_ratio_filter: RegionFilter,
    /// Fraction of width and height added to each side of a final region.
    pub percent_to_expand_final_region_by: f64,
    /// Write intermediate hue, texture and mask previews. Diagnostic only.
    pub save_progress_images: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            maximum_image_dimension: 200,
            calculate_scale: fixed_scale,
            texture_amplitude_first_pass_multiplier: 2,
            texture_amplitude_second_pass_multiplier: 3,
            rg_by_smoothen_multiplier: 2,
            strict_skin_filter: default_skin_filter,
            relaxed_skin_filter: default_relaxed_skin_filter,
            number_of_relaxed_expansions: 2,
            aspect_ratio_filter,
            percent_to_expand_final_region_by: 0.13,
            save_progress_images: false,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.maximum_image_dimension == 0 {
            return Err(Error::InvalidArgument(
                "maximum image dimension must be positive".into(),
            ));
        }
        if self.texture_amplitude_first_pass_multiplier == 0
            || self.texture_amplitude_second_pass_multiplier == 0
            || self.rg_by_smoothen_multiplier == 0
        {
            return Err(Error::InvalidArgument(
                "smoothing multipliers must be positive".into(),
            ));
        }
        if !self.percent_to_expand_final_region_by.is_finite()
            || self.percent_to_expand_final_region_by < 0.0
        {
            return Err(Error::InvalidArgument(format!(
                "final region expansion must be a non-negative number, got {}",
                self.percent_to_expand_final_region_by
            )));
        }
        Ok(())
    }

    /// Scale for an image of the given size. A scale below one is rejected.
    pub fn scale_for(&self, width: usize, height: usize) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "cannot calculate scale for a {}x{} image",
                width, height
            )));
        }
        let scale = (self.calculate_scale)(width, height);
        if scale == 0 {
            return Err(Error::InvalidArgument(format!(
                "scale for a {}x{} image must be at least 1",
                width, height
            )));
        }
        Ok(scale)
    }

    pub fn smoothing_radii(&self, scale: usize) -> SmoothingRadii {
        SmoothingRadii {
            texture_first_pass: self.texture_amplitude_first_pass_multiplier * scale,
            texture_second_pass: self.texture_amplitude_second_pass_multiplier * scale,
            rg_by: self.rg_by_smoothen_multiplier * scale,
        }
    }
}

/// With images capped at 200px a fixed low scale is good enough.
pub fn fixed_scale(_width: usize, _height: usize) -> usize {
    2
}

/// Strict first-pass filter. The second hue band only admits a saturation of
/// exactly 30 so strong yellow tones are rarely matched.
pub fn default_skin_filter(colour: &HueSaturation) -> bool {
    let (hue, saturation) = (colour.hue, colour.saturation);
    let warm = (105.0..=160.0).contains(&hue) && (10.0..=60.0).contains(&saturation);
    let yellow = (160.0..=180.0).contains(&hue) && saturation >= 30.0 && saturation <= 30.0;
    (warm || yellow) && colour.texture_amplitude <= 5.0
}

/// Relaxed filter from Fleck & Forsyth, used when growing the mask.
pub fn default_relaxed_skin_filter(colour: &HueSaturation) -> bool {
    (110.0..=180.0).contains(&colour.hue) && (0.0..=180.0).contains(&colour.saturation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(hue: f64, saturation: f64, texture_amplitude: f64) -> HueSaturation {
        HueSaturation {
            hue,
            saturation,
            texture_amplitude,
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = DetectorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.scale_for(640, 480).unwrap(), 2);
        assert_eq!(
            config.smoothing_radii(2),
            SmoothingRadii {
                texture_first_pass: 4,
                texture_second_pass: 6,
                rg_by: 4,
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = DetectorConfig::default();
        config.rg_by_smoothen_multiplier = 0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.percent_to_expand_final_region_by = -0.5;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.maximum_image_dimension = 0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.calculate_scale = |_, _| 0;
        assert!(config.scale_for(10, 10).is_err());
        assert!(DetectorConfig::default().scale_for(0, 10).is_err());
    }

    #[test]
    fn strict_filter_bands() {
        assert!(default_skin_filter(&sample(140.0, 20.0, 0.0)));
        assert!(default_skin_filter(&sample(105.0, 10.0, 5.0)));
        assert!(!default_skin_filter(&sample(140.0, 20.0, 5.5)));
        assert!(!default_skin_filter(&sample(100.0, 20.0, 0.0)));
        assert!(!default_skin_filter(&sample(140.0, 61.0, 0.0)));

        assert!(default_skin_filter(&sample(170.0, 30.0, 0.0)));
        assert!(!default_skin_filter(&sample(170.0, 31.0, 0.0)));
    }

    #[test]
    fn relaxed_filter_bands() {
        assert!(default_relaxed_skin_filter(&sample(110.0, 0.0, 100.0)));
        assert!(default_relaxed_skin_filter(&sample(180.0, 180.0, 0.0)));
        assert!(!default_relaxed_skin_filter(&sample(109.0, 20.0, 0.0)));
        assert!(!default_relaxed_skin_filter(&sample(150.0, 181.0, 0.0)));
    }
}
