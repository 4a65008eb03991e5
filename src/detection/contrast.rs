//! Contrast-relative threshold generator.
//!
//! Thresholds at a fixed fraction of the region mean, never below an
//! absolute floor. Used as a fallback under unusual lighting.

use super::components::{best_candidate, has_contrast, mask_where};
use super::{Candidate, CandidateGenerator, DetectionMethod};
use crate::config::DetectionConfig;
use crate::constants::CONTRAST_THRESHOLD_CONFIDENCE_SCALE;
use crate::utils::{image_conversion::blur, mean_intensity};
use image::GrayImage;

/// Mean-relative threshold followed by connected-component scoring
pub struct ContrastThresholdGenerator {
    config: DetectionConfig,
}

impl ContrastThresholdGenerator {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Threshold for a region with the given mean intensity
    #[must_use]
    pub fn threshold(&self, mean: f64) -> f64 {
        let contrast = &self.config.contrast;
        contrast.min_absolute_threshold.max(mean * contrast.scale)
    }
}

impl CandidateGenerator for ContrastThresholdGenerator {
    fn generate(&self, roi: &GrayImage) -> Option<Candidate> {
        let blurred = blur(roi, self.config.blur_sigma);
        if !has_contrast(&blurred) {
            return None;
        }
        let threshold = self.threshold(mean_intensity(&blurred)?);
        let mask = mask_where(&blurred, |_, _, value| f64::from(value) < threshold);
        best_candidate(&mask, &self.config, self.method(), CONTRAST_THRESHOLD_CONFIDENCE_SCALE)
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::ContrastThreshold
    }
}
