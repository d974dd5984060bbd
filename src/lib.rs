//! # skin-face
//!
//! Pure Rust face region detection from skin tone, with an optional HOG +
//! linear SVM confirmation stage.
//!
//! This crate provides:
//! - **Detection**: skin-tone masking and enclosed-hole analysis that proposes
//!   candidate face rectangles without any trained model
//! - **Classification**: histogram-of-gradient features scored by a linear
//!   support vector machine to confirm or reject each candidate
//! - **Model files**: a compact fixed-point format for linear SVMs, optionally
//!   bzip2-compressed
//!
//! Based on Fleck & Forsyth's "Naked People Skin Filter" as adapted in Jay
//! Kapur's face detection notes.
//!
//! ## Algorithm Overview
//!
//! 1. Shrink large images so the longest side is at most 200px
//! 2. Convert pixels to log-opponent `I/Rg/By` values, then median-smooth them
//!    into hue, saturation and texture amplitude
//! 3. Build a skin mask: a strict filter, a few relaxed growth passes and an
//!    intensity check
//! 4. Flood fill the mask into objects and keep those that fully enclose a
//!    non-skin hole (eyes, mouth)
//! 5. Drop oddly shaped or redundant regions, pad the rest, and scale them
//!    back to the original image
//!
//! ## Quick Start
//!
//! ```rust
//! use skin_face::{DetectorConfig, FaceDetector, RgbImage};
//!
//! let detector = FaceDetector::new(DetectorConfig::default()).unwrap();
//! let image = RgbImage::new(64, 64);
//! let regions = detector.possible_face_regions(&image).unwrap();
//! assert!(regions.is_empty());
//! ```
//!
//! ## Confirming Regions
//!
//! ```rust
//! use skin_face::{FaceClassifier, Linear, Rectangle, RgbImage, SupportVectorMachine};
//!
//! // A model trained on 128x128 samples with 8px cells has 16 * 16 * 9 inputs
//! let inputs = 16 * 16 * 9;
//! let svm = SupportVectorMachine::new(inputs, Linear::default(), vec![vec![0.0; inputs]], vec![1.0], 0.0).unwrap();
//! let classifier = FaceClassifier::new(svm).unwrap();
//!
//! let image = RgbImage::new(64, 64);
//! let is_face = classifier.is_face(&image, Rectangle::new(8, 8, 32, 32)).unwrap();
//! assert!(is_face);
//! ```

pub mod classifier;
pub mod codec;
pub mod colour;
pub mod config;
pub mod detector;
mod error;
pub mod filter;
pub mod grid;
pub mod hog;
pub mod imaging;
pub mod regions;
pub mod skin;
pub mod svm;
mod types;

pub use classifier::FaceClassifier;
pub use codec::{decode, encode, load_model, save_model};
pub use colour::HueSaturation;
pub use config::DetectorConfig;
pub use detector::FaceDetector;
pub use error::{Error, Result};
pub use grid::Grid;
pub use hog::HistogramOfGradient;
pub use image::RgbImage;
pub use svm::{Kernel, Linear, SupportVectorMachine};
pub use types::{Position, Rectangle, Rgb, Size};
