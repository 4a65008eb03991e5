//! Otsu threshold generator.
//!
//! One histogram-derived threshold for the whole region. More sensitive to
//! illumination gradients than the adaptive method, so its confidence is
//! scaled down slightly.

use super::components::{best_candidate, has_contrast, mask_where};
use super::{Candidate, CandidateGenerator, DetectionMethod};
use crate::config::DetectionConfig;
use crate::constants::GLOBAL_THRESHOLD_CONFIDENCE_SCALE;
use crate::utils::image_conversion::blur;
use image::GrayImage;
use imageproc::contrast::otsu_level;

/// Global Otsu threshold followed by connected-component scoring
pub struct GlobalThresholdGenerator {
    config: DetectionConfig,
}

impl GlobalThresholdGenerator {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }
}

impl CandidateGenerator for GlobalThresholdGenerator {
    fn generate(&self, roi: &GrayImage) -> Option<Candidate> {
        let blurred = blur(roi, self.config.blur_sigma);
        if !has_contrast(&blurred) {
            return None;
        }
        let level = otsu_level(&blurred);
        let mask = mask_where(&blurred, |_, _, value| value <= level);
        best_candidate(&mask, &self.config, self.method(), GLOBAL_THRESHOLD_CONFIDENCE_SCALE)
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::GlobalThreshold
    }
}
