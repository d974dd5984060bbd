//! Skin-tone face region detection.
//!
//! [`FaceDetector`] wires the pipeline stages together:
//!
//! 1. Downscale the image so its longest side fits the configured maximum.
//! 2. Correct the zero response and derive hue, saturation and texture.
//! 3. Build the skin mask (strict pass, relaxed expansions, intensity check).
//! 4. Keep skin objects that enclose a hole, filter and pad their bounds.
//! 5. Scale the regions back onto the original image.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use log::{debug, info};

use crate::colour::{analyse, correct_zero_response};
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::filter::{expand_rectangle, scale_rectangle};
use crate::grid::Grid;
use crate::imaging::{downscale_factor, grid_from_image, image_size, shrink_by, ProgressImages};
use crate::regions::{has_enclosed_hole, skin_objects};
use crate::skin::build_skin_mask;
use crate::types::{Rectangle, Rgb};

/// Receives a human-readable message as each stage completes.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone)]
pub struct FaceDetector {
    config: DetectorConfig,
    progress: Option<ProgressCallback>,
    progress_images: Option<ProgressImages>,
}

impl fmt::Debug for FaceDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceDetector")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .field("progress_images", &self.progress_images)
            .finish()
    }
}

/// Elapsed-time reporter for a single detection call.
struct Stages<'a> {
    started: Instant,
    progress: Option<&'a ProgressCallback>,
}

impl Stages<'_> {
    fn report(&self, message: &str) {
        let message = format!("[{}ms] {}", self.started.elapsed().as_millis(), message);
        debug!("{}", message);
        if let Some(progress) = self.progress {
            progress(&message);
        }
    }
}

impl FaceDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
            progress_images: None,
        })
    }

    /// Forward stage-completion messages to `callback`.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Write progress previews into `directory` when the config enables them.
    pub fn with_progress_directory<P: AsRef<Path>>(mut self, directory: P) -> Result<Self> {
        self.progress_images = Some(ProgressImages::new(directory)?);
        Ok(self)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn stages(&self) -> Stages<'_> {
        Stages {
            started: Instant::now(),
            progress: self.progress.as_ref(),
        }
    }

    fn previews(&self) -> Option<&ProgressImages> {
        if self.config.save_progress_images {
            self.progress_images.as_ref()
        } else {
            None
        }
    }

    /// Candidate face regions in the coordinates of `image`.
    pub fn possible_face_regions(&self, image: &RgbImage) -> Result<Vec<Rectangle>> {
        let stages = self.stages();
        let original_size = image_size(image);
        let scale_down = downscale_factor(original_size, self.config.maximum_image_dimension);

        let colour_data = if scale_down > 1.0 {
            let colour_data = grid_from_image(&shrink_by(image, scale_down)?)?;
            stages.report(&format!("Loaded pixel colour data (scale down: {})", scale_down));
            colour_data
        } else {
            let colour_data = grid_from_image(image)?;
            stages.report("Loaded pixel colour data");
            colour_data
        };

        let mut regions = self.regions_from_colour_data(&colour_data, &stages)?;
        if scale_down > 1.0 {
            regions = regions
                .into_iter()
                .map(|region| scale_rectangle(region, scale_down, original_size))
                .collect::<Result<_>>()?;
        }

        stages.report(&format!(
            "Complete - {} region(s) identified by skin tone face detector",
            regions.len()
        ));
        info!(
            "{} possible face region(s) in {}x{} image",
            regions.len(),
            original_size.width,
            original_size.height
        );
        Ok(regions)
    }

    /// Run the detection pipeline on colour data without any resizing.
    pub fn possible_face_regions_from_colour_data(&self, colours: &Grid<Rgb>) -> Result<Vec<Rectangle>> {
        let stages = self.stages();
        self.regions_from_colour_data(colours, &stages)
    }

    fn regions_from_colour_data(&self, source: &Grid<Rgb>, stages: &Stages<'_>) -> Result<Vec<Rectangle>> {
        let config = &self.config;
        let previews = self.previews();

        let scale = config.scale_for(source.width(), source.height())?;
        stages.report(&format!(
            "Loaded file - Dimensions: {}x{}, Skin Tone Filter Scale: {}",
            source.width(),
            source.height(),
            scale
        ));

        let colour_data = correct_zero_response(source);
        stages.report("Corrected zero response");

        let hues = analyse(&colour_data, config.smoothing_radii(scale))?;
        stages.report("Calculated hue, saturation and texture amplitude");
        if let Some(previews) = previews {
            previews.save_hue_saturation(&hues)?;
        }

        let masks = build_skin_mask(
            &colour_data,
            &hues,
            config.strict_skin_filter,
            config.relaxed_skin_filter,
            config.number_of_relaxed_expansions,
        )?;
        stages.report(&format!(
            "Built skin mask ({} relaxed expansion(s))",
            config.number_of_relaxed_expansions
        ));
        if let Some(previews) = previews {
            previews.save_mask("SkinMask1", &masks.initial)?;
            previews.save_mask("SkinMask2", &masks.expanded)?;
            previews.save_mask("SkinMask3", &masks.confirmed)?;
        }
        let mask = masks.confirmed;

        let objects = skin_objects(&mask, scale)?;
        if let Some(previews) = previews {
            previews.save_skin_objects(&mask, &objects)?;
        }
        let mut candidates = Vec::new();
        for object in &objects {
            if has_enclosed_hole(&mask, object, scale)? {
                candidates.push(object.bounds);
            }
        }
        debug!(
            "{} skin object(s), {} with an enclosed hole",
            objects.len(),
            candidates.len()
        );

        let image_size = source.size();
        let regions = (config.aspect_ratio_filter)(&candidates)?
            .into_iter()
            .map(|region| expand_rectangle(region, config.percent_to_expand_final_region_by, image_size))
            .collect::<Result<Vec<_>>>()?;
        stages.report("Identified face regions");
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = DetectorConfig::default();
        config.maximum_image_dimension = 0;
        assert!(FaceDetector::new(config).is_err());
    }

    #[test]
    fn black_image_has_no_regions_and_reports_progress() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let detector = FaceDetector::new(DetectorConfig::default())
            .unwrap()
            .with_progress(move |message| sink.lock().unwrap().push(message.to_string()));

        let regions = detector.possible_face_regions(&RgbImage::new(64, 64)).unwrap();
        assert!(regions.is_empty());

        let messages = messages.lock().unwrap();
        assert!(messages.first().unwrap().contains("Loaded pixel colour data"));
        assert!(messages.last().unwrap().contains("0 region(s)"));
        assert!(messages.iter().all(|m| m.starts_with('[')));
    }

    #[test]
    fn large_images_are_downscaled() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let detector = FaceDetector::new(DetectorConfig::default())
            .unwrap()
            .with_progress(move |message| sink.lock().unwrap().push(message.to_string()));

        detector.possible_face_regions(&RgbImage::new(400, 100)).unwrap();
        let messages = messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.contains("scale down: 2")));
        assert!(messages.iter().any(|m| m.contains("Dimensions: 200x50")));
    }
}
