//! Confirms candidate regions with a linear SVM over HOG features.

use std::path::Path;

use image::RgbImage;
use log::debug;

use crate::codec::load_model;
use crate::error::{Error, Result};
use crate::hog::{feature_vector, NUMBER_OF_BINS};
use crate::imaging::{extract_section_and_resize, grid_from_image};
use crate::svm::{Linear, SupportVectorMachine};
use crate::types::{Rectangle, Size};

pub const DEFAULT_SAMPLE_SIZE: Size = Size::new(128, 128);
pub const DEFAULT_CELL_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct FaceClassifier {
    svm: SupportVectorMachine<Linear>,
    sample_size: Size,
    cell_size: usize,
}

impl FaceClassifier {
    /// Classifier over 128×128 samples split into 8px cells.
    pub fn new(svm: SupportVectorMachine<Linear>) -> Result<Self> {
        Self::with_sampling(svm, DEFAULT_SAMPLE_SIZE, DEFAULT_CELL_SIZE)
    }

    pub fn with_sampling(svm: SupportVectorMachine<Linear>, sample_size: Size, cell_size: usize) -> Result<Self> {
        if cell_size == 0 {
            return Err(Error::InvalidArgument("cell size must be positive".into()));
        }
        let cells = (sample_size.width / cell_size) * (sample_size.height / cell_size);
        let expected = cells * NUMBER_OF_BINS;
        if expected == 0 || svm.number_of_inputs() != expected {
            return Err(Error::InvalidModel(format!(
                "model expects {} inputs but {}x{} samples with {}px cells give {}",
                svm.number_of_inputs(),
                sample_size.width,
                sample_size.height,
                cell_size,
                expected
            )));
        }
        Ok(Self {
            svm,
            sample_size,
            cell_size,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(load_model(path)?)
    }

    pub fn svm(&self) -> &SupportVectorMachine<Linear> {
        &self.svm
    }

    pub fn sample_size(&self) -> Size {
        self.sample_size
    }

    /// HOG features of `region` sampled at the classifier's sample size.
    pub fn features(&self, image: &RgbImage, region: Rectangle) -> Result<Vec<f64>> {
        let sample = extract_section_and_resize(image, region, self.sample_size)?;
        let grey = grid_from_image(&sample)?.transform(|colour| colour.to_greyscale());
        feature_vector(&grey, self.cell_size)
    }

    pub fn score(&self, image: &RgbImage, region: Rectangle) -> Result<f64> {
        let score = self.svm.score(&self.features(image, region)?)?;
        debug!("Region {:?} scored {:.4}", region, score);
        Ok(score)
    }

    pub fn is_face(&self, image: &RgbImage, region: Rectangle) -> Result<bool> {
        Ok(self.score(image, region)? >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bias_only(inputs: usize, threshold: f64) -> SupportVectorMachine<Linear> {
        SupportVectorMachine::new(inputs, Linear::default(), vec![vec![0.0; inputs]], vec![1.0], threshold).unwrap()
    }

    #[test]
    fn input_count_must_match_sampling() {
        assert!(FaceClassifier::new(bias_only(2304, 0.0)).is_ok());
        assert!(FaceClassifier::new(bias_only(2303, 0.0)).is_err());
        assert!(FaceClassifier::with_sampling(bias_only(36, 0.0), Size::new(16, 16), 8).is_ok());
        assert!(FaceClassifier::with_sampling(bias_only(36, 0.0), Size::new(16, 16), 0).is_err());
    }

    #[test]
    fn flat_region_produces_uniform_features() {
        let classifier = FaceClassifier::with_sampling(bias_only(36, 0.0), Size::new(16, 16), 8).unwrap();
        let image = RgbImage::from_pixel(40, 40, image::Rgb([90, 90, 90]));
        let features = classifier.features(&image, Rectangle::new(5, 5, 30, 30)).unwrap();
        assert_eq!(features.len(), 36);
        assert!(features.iter().all(|v| (v - 1.0 / 9.0).abs() < 1e-12));
    }

    #[test]
    fn decision_follows_score_sign() {
        let image = RgbImage::from_pixel(40, 40, image::Rgb([90, 90, 90]));
        let region = Rectangle::new(0, 0, 40, 40);

        let positive = FaceClassifier::with_sampling(bias_only(36, 0.0), Size::new(16, 16), 8).unwrap();
        assert_eq!(positive.score(&image, region).unwrap(), 0.0);
        assert!(positive.is_face(&image, region).unwrap());

        let negative = FaceClassifier::with_sampling(bias_only(36, -0.25), Size::new(16, 16), 8).unwrap();
        assert!(!negative.is_face(&image, region).unwrap());
    }
}
