//! Histogram-of-oriented-gradient features.
//!
//! Orientations are unsigned (folded into `[0, 180)`) and split over nine bins
//! centred at 10°, 30°, ..., 170°.

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::types::Position;

pub const NUMBER_OF_BINS: usize = 9;
pub const BIN_WIDTH_DEGREES: f64 = 20.0;
pub const BIN_CENTRES: [f64; NUMBER_OF_BINS] = [10.0, 30.0, 50.0, 70.0, 90.0, 110.0, 130.0, 150.0, 170.0];

/// Gradient magnitudes accumulated per orientation bin. All bins are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramOfGradient {
    bins: [f64; NUMBER_OF_BINS],
}

impl HistogramOfGradient {
    pub fn new(bins: [f64; NUMBER_OF_BINS]) -> Result<Self> {
        if let Some(bad) = bins.iter().find(|v| !(**v >= 0.0)) {
            return Err(Error::InvalidArgument(format!(
                "histogram magnitudes must be non-negative, got {}",
                bad
            )));
        }
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[f64; NUMBER_OF_BINS] {
        &self.bins
    }

    pub fn sum_of_magnitudes(&self) -> f64 {
        self.bins.iter().sum()
    }

    pub fn greatest_magnitude(&self) -> f64 {
        self.bins.iter().copied().fold(0.0, f64::max)
    }

    pub fn multiply(&self, factor: f64) -> Result<Self> {
        Self::new(self.bins.map(|v| v * factor))
    }

    /// Rotate by 90°. Each bin lands exactly between two bins, so its weight is
    /// split evenly over them (10° goes half to 90° and half to 110°).
    pub fn rotate_90_degrees(&self) -> Self {
        let b = &self.bins;
        Self {
            bins: [
                b[4] / 2.0 + b[5] / 2.0,
                b[5] / 2.0 + b[6] / 2.0,
                b[6] / 2.0 + b[7] / 2.0,
                b[7] / 2.0 + b[8] / 2.0,
                b[8] / 2.0 + b[0] / 2.0,
                b[0] / 2.0 + b[1] / 2.0,
                b[1] / 2.0 + b[2] / 2.0,
                b[2] / 2.0 + b[3] / 2.0,
                b[3] / 2.0 + b[4] / 2.0,
            ],
        }
    }

    /// Rescale so the bins sum to one. A histogram with no gradients at all
    /// becomes uniform.
    pub fn normalise(&self) -> Self {
        let sum = self.sum_of_magnitudes();
        if sum == 0.0 {
            return Self {
                bins: [1.0 / NUMBER_OF_BINS as f64; NUMBER_OF_BINS],
            };
        }
        Self {
            bins: self.bins.map(|v| v / sum),
        }
    }

    /// Add `magnitude` at `degrees`, split linearly between the two nearest
    /// bin centres. Angles outside `[10, 170]` are shared between 170° and 10°.
    fn accumulate(&mut self, degrees: f64, magnitude: f64) {
        let position = (degrees - BIN_CENTRES[0]) / BIN_WIDTH_DEGREES;
        let lower = position.floor();
        let upper_share = position - lower;
        let lower_bin = (lower as i64).rem_euclid(NUMBER_OF_BINS as i64) as usize;
        let upper_bin = (lower_bin + 1) % NUMBER_OF_BINS;
        self.bins[lower_bin] += magnitude * (1.0 - upper_share);
        self.bins[upper_bin] += magnitude * upper_share;
    }
}

/// Per-pixel gradient (magnitude, unsigned orientation in degrees). Central
/// differences inside the grid, one-sided differences on its border.
pub fn gradients(grey: &Grid<f64>) -> Grid<(f64, f64)> {
    let width = grey.width();
    let height = grey.height();
    grey.transform_with_position(|_, p| {
        let dx = difference(p.x, width, |x| grey[Position::new(x, p.y)]);
        let dy = difference(p.y, height, |y| grey[Position::new(p.x, y)]);
        let magnitude = (dx * dx + dy * dy).sqrt();
        let orientation = dy.atan2(dx).to_degrees().rem_euclid(180.0);
        // rem_euclid can round up to exactly 180 for tiny negative angles
        let orientation = if orientation >= 180.0 { 0.0 } else { orientation };
        (magnitude, orientation)
    })
}

fn difference<F>(index: usize, length: usize, value_at: F) -> f64
where
    F: Fn(usize) -> f64,
{
    if length < 2 {
        return 0.0;
    }
    if index == 0 {
        value_at(1) - value_at(0)
    } else if index + 1 == length {
        value_at(index) - value_at(index - 1)
    } else {
        (value_at(index + 1) - value_at(index - 1)) / 2.0
    }
}

/// One histogram per non-overlapping `cell_size × cell_size` cell. Partial
/// cells at the right and bottom are ignored.
pub fn histograms_for_cells(grey: &Grid<f64>, cell_size: usize) -> Result<Grid<HistogramOfGradient>> {
    if cell_size == 0 {
        return Err(Error::InvalidArgument("cell size must be positive".into()));
    }
    let cells_across = grey.width() / cell_size;
    let cells_down = grey.height() / cell_size;
    if cells_across == 0 || cells_down == 0 {
        return Err(Error::InvalidArgument(format!(
            "a {}x{} image is smaller than one {}px cell",
            grey.width(),
            grey.height(),
            cell_size
        )));
    }

    let gradients = gradients(grey);
    let mut histograms = vec![HistogramOfGradient::default(); cells_across * cells_down];
    for (position, (magnitude, orientation)) in gradients.enumerate() {
        let cell_x = position.x / cell_size;
        let cell_y = position.y / cell_size;
        if cell_x >= cells_across || cell_y >= cells_down {
            continue;
        }
        histograms[cell_y * cells_across + cell_x].accumulate(*orientation, *magnitude);
    }
    Grid::new(cells_across, cells_down, histograms)
}

/// Normalised cell histograms concatenated in row-major cell order.
pub fn feature_vector(grey: &Grid<f64>, cell_size: usize) -> Result<Vec<f64>> {
    let histograms = histograms_for_cells(grey, cell_size)?;
    Ok(histograms
        .values()
        .iter()
        .flat_map(|histogram| histogram.normalise().bins)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bin(index: usize) -> HistogramOfGradient {
        let mut bins = [0.0; NUMBER_OF_BINS];
        bins[index] = 1.0;
        HistogramOfGradient::new(bins).unwrap()
    }

    fn assert_bins_close(actual: &[f64; NUMBER_OF_BINS], expected: &[f64; NUMBER_OF_BINS]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn negative_magnitudes_are_rejected() {
        let mut bins = [0.0; NUMBER_OF_BINS];
        bins[3] = -0.1;
        assert!(HistogramOfGradient::new(bins).is_err());
        assert!(unit_bin(0).multiply(-1.0).is_err());
    }

    #[test]
    fn derived_magnitudes() {
        let histogram = HistogramOfGradient::new([1.0, 2.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.5]).unwrap();
        assert_eq!(histogram.sum_of_magnitudes(), 8.5);
        assert_eq!(histogram.greatest_magnitude(), 5.0);
        assert_eq!(histogram.multiply(2.0).unwrap().sum_of_magnitudes(), 17.0);
    }

    #[test]
    fn rotating_ten_degree_bin_splits_between_ninety_and_one_ten() {
        let rotated = unit_bin(0).rotate_90_degrees();
        assert_bins_close(rotated.bins(), &[0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn rotating_four_times_spreads_weight_around_start_bin() {
        // The half-splits accumulate, so four rotations blur rather than restore
        let mut histogram = unit_bin(0);
        for _ in 0..4 {
            histogram = histogram.rotate_90_degrees();
        }
        assert_bins_close(
            histogram.bins(),
            &[0.375, 0.25, 0.0625, 0.0, 0.0, 0.0, 0.0, 0.0625, 0.25],
        );
        assert!((histogram.sum_of_magnitudes() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalise_sums_to_one() {
        let histogram = HistogramOfGradient::new([3.0, 0.0, 1.0, 0.0, 0.0, 4.0, 0.0, 0.0, 2.0]).unwrap();
        let normalised = histogram.normalise();
        assert!((normalised.sum_of_magnitudes() - 1.0).abs() < 1e-12);
        assert!((normalised.bins()[5] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn normalising_empty_histogram_is_uniform() {
        let normalised = HistogramOfGradient::default().normalise();
        assert!(normalised.bins().iter().all(|v| *v == 1.0 / 9.0));
    }

    #[test]
    fn accumulate_splits_between_neighbouring_bins() {
        let mut histogram = HistogramOfGradient::default();
        histogram.accumulate(40.0, 2.0);
        assert_bins_close(histogram.bins(), &[0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let mut histogram = HistogramOfGradient::default();
        histogram.accumulate(0.0, 1.0);
        assert_bins_close(histogram.bins(), &[0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);

        let mut histogram = HistogramOfGradient::default();
        histogram.accumulate(175.0, 4.0);
        assert_bins_close(histogram.bins(), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn horizontal_ramp_has_zero_degree_gradients() {
        let grey = Grid::from_fn(4, 3, |p| p.x as f64 * 10.0).unwrap();
        let gradients = gradients(&grey);
        for (_, (magnitude, orientation)) in gradients.enumerate() {
            assert!((magnitude - 10.0).abs() < 1e-12);
            assert_eq!(*orientation, 0.0);
        }
    }

    #[test]
    fn vertical_ramp_lands_in_ninety_degree_bin() {
        let grey = Grid::from_fn(8, 8, |p| p.y as f64).unwrap();
        let histograms = histograms_for_cells(&grey, 8).unwrap();
        assert_eq!(histograms.len(), 1);
        let bins = histograms.values()[0].bins();
        assert!((bins[4] - 64.0).abs() < 1e-9);
        assert_eq!(bins.iter().filter(|v| **v > 0.0).count(), 1);
    }

    #[test]
    fn partial_cells_are_ignored() {
        let grey = Grid::new(17, 9, vec![0.0; 17 * 9]).unwrap();
        let histograms = histograms_for_cells(&grey, 8).unwrap();
        assert_eq!((histograms.width(), histograms.height()), (2, 1));
        assert!(histograms_for_cells(&grey, 10).is_err());
        assert!(histograms_for_cells(&grey, 0).is_err());
    }

    #[test]
    fn flat_image_features_are_uniform() {
        let grey = Grid::new(16, 16, vec![128.0; 256]).unwrap();
        let features = feature_vector(&grey, 8).unwrap();
        assert_eq!(features.len(), 4 * NUMBER_OF_BINS);
        assert!(features.iter().all(|v| *v == 1.0 / 9.0));
    }
}
