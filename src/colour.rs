//! Colour and texture analysis.
//!
//! Converts RGB pixels into the log-opponent `I/Rg/By` representation and from
//! there into smoothed hue, saturation and texture amplitude values. See Fleck
//! & Forsyth, "Naked People Skin Filter", and Jay Kapur's face detection notes
//! for the underlying formulation.

use crate::error::Result;
use crate::grid::Grid;
use crate::types::Rgb;

/// Log-opponent colour sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IRgBy {
    /// Red/green opponent channel.
    pub rg: f64,
    /// Blue/yellow opponent channel.
    pub by: f64,
    /// Intensity.
    pub i: f64,
}

/// Smoothed perceptual sample used by the skin filters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HueSaturation {
    /// Hue in degrees, in `(-180, 180]`.
    pub hue: f64,
    pub saturation: f64,
    /// Local intensity variation; low for skin, high for textured backgrounds.
    pub texture_amplitude: f64,
}

/// Radii of the median filters used while building hue and texture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothingRadii {
    pub texture_first_pass: usize,
    pub texture_second_pass: usize,
    pub rg_by: usize,
}

/// Logarithmic channel response `L(c) = 105 * log10(c + 1)`.
#[inline]
pub fn log_response(channel: u8) -> f64 {
    105.0 * (channel as f64 + 1.0).log10()
}

/// Subtract the smallest channel value found anywhere in the image from every
/// channel of every pixel.
pub fn correct_zero_response(values: &Grid<Rgb>) -> Grid<Rgb> {
    let smallest = values
        .values()
        .iter()
        .map(Rgb::min_channel)
        .min()
        .unwrap_or(0);
    values.transform(|colour| {
        Rgb::new(
            colour.r.saturating_sub(smallest),
            colour.g.saturating_sub(smallest),
            colour.b.saturating_sub(smallest),
        )
    })
}

pub fn to_irgby(colour: &Rgb) -> IRgBy {
    let r = log_response(colour.r);
    let g = log_response(colour.g);
    let b = log_response(colour.b);
    IRgBy {
        rg: r - g,
        by: b - (g + r) / 2.0,
        i: (r + b + g) / 3.0,
    }
}

pub fn irgby_values(values: &Grid<Rgb>) -> Grid<IRgBy> {
    values.transform(to_irgby)
}

/// Texture amplitude: the intensity is median-smoothed, subtracted from the
/// unsmoothed intensity, and the absolute differences are median-smoothed
/// again.
pub fn texture_amplitude(
    values: &Grid<IRgBy>,
    first_pass_radius: usize,
    second_pass_radius: usize,
) -> Result<Grid<f64>> {
    let smoothed_intensity = values.median_filter(|value| value.i, first_pass_radius);
    let difference = values.combine_with(&smoothed_intensity, |value, smoothed| {
        (value.i - smoothed).abs()
    })?;
    Ok(difference.median_filter(|value| *value, second_pass_radius))
}

/// Combine median-smoothed `Rg`/`By` channels with texture amplitude into
/// hue/saturation samples.
pub fn hue_saturation(
    values: &Grid<IRgBy>,
    texture_amplitude: &Grid<f64>,
    rg_by_radius: usize,
) -> Result<Grid<HueSaturation>> {
    let smoothed_rg = values.median_filter(|value| value.rg, rg_by_radius);
    let smoothed_by = values.median_filter(|value| value.by, rg_by_radius);
    let hue_and_saturation = smoothed_rg.combine_with(&smoothed_by, |rg, by| {
        (rg.atan2(*by).to_degrees(), (rg * rg + by * by).sqrt())
    })?;
    hue_and_saturation.combine_with(texture_amplitude, |(hue, saturation), amplitude| {
        HueSaturation {
            hue: *hue,
            saturation: *saturation,
            texture_amplitude: *amplitude,
        }
    })
}

/// Run the full colour analysis over zero-corrected pixels.
pub fn analyse(values: &Grid<Rgb>, radii: SmoothingRadii) -> Result<Grid<HueSaturation>> {
    let irgby = irgby_values(values);
    let amplitude = texture_amplitude(&irgby, radii.texture_first_pass, radii.texture_second_pass)?;
    hue_saturation(&irgby, &amplitude, radii.rg_by)
}
