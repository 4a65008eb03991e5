//! Adaptive local threshold generator.
//!
//! A pixel is pupil-like when it is darker than its neighbourhood. The
//! neighbourhood mean comes from a box filter whose radius grows with the
//! region so that the window always reaches past the pupil rim. The cut-off
//! is also capped at the midpoint between the local mean and the region
//! minimum. Only the darkest `dark_percentile` of the region may be flagged
//! at all.
//!
//! The local mean still includes sclera, so a pupil inside a darker iris comes
//! out too wide. The best blob is therefore cut again at the midpoint between
//! its darkest pixel and the median of a thin rim just outside it, which puts
//! the boundary on the pupil edge itself.

use super::components::{best_candidate, has_contrast, mask_where};
use super::{Candidate, CandidateGenerator, DetectionMethod};
use crate::config::DetectionConfig;
use crate::utils::{distance, image_conversion::blur, intensity_percentile};
use image::GrayImage;
use imageproc::filter::box_filter;

/// Gap between a coarse blob's rim and the sampled surround (pixels)
pub const RIM_GAP: f64 = 1.0;

/// Width of the sampled surround (pixels)
pub const RIM_WIDTH: f64 = 2.0;

/// Locally-adaptive threshold followed by connected-component scoring
pub struct AdaptiveThresholdGenerator {
    config: DetectionConfig,
}

impl AdaptiveThresholdGenerator {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Radius of the local-mean window for a region of the given size
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn block_radius(&self, width: u32, height: u32) -> u32 {
        let adaptive = &self.config.adaptive;
        let scaled = (f64::from(width.min(height)) * adaptive.block_fraction) as u32;
        adaptive.block_radius.max(scaled).max(1)
    }

    /// Binary mask of pixels darker than their neighbourhood
    #[must_use]
    pub fn mask(&self, blurred: &GrayImage) -> GrayImage {
        let (width, height) = blurred.dimensions();
        let radius = self.block_radius(width, height);
        let local_mean = box_filter(blurred, radius, radius);

        let adaptive = &self.config.adaptive;
        let darkest = blurred.as_raw().iter().copied().min().unwrap_or(0);
        let dark_cap = intensity_percentile(blurred, adaptive.dark_percentile).unwrap_or(0);

        mask_where(blurred, |x, y, value| {
            let mean = f64::from(local_mean.get_pixel(x, y).0[0]);
            let offset_cut = mean - f64::from(adaptive.offset);
            let midpoint_cut = (mean + f64::from(darkest)) / 2.0;
            value <= dark_cap && f64::from(value) < offset_cut.min(midpoint_cut)
        })
    }

    /// Midpoint between the darkest pixel inside `radius` and the median of the
    /// rim `RIM_GAP..RIM_GAP + RIM_WIDTH` beyond it
    #[must_use]
    pub fn rim_cut(blurred: &GrayImage, center: (f64, f64), radius: f64) -> Option<f64> {
        let (inner_limit, outer_limit) = (radius + RIM_GAP, radius + RIM_GAP + RIM_WIDTH);
        let mut inner: Option<u8> = None;
        let mut rim = Vec::new();
        for (x, y, pixel) in blurred.enumerate_pixels() {
            let value = pixel.0[0];
            let d = distance((f64::from(x), f64::from(y)), center);
            if d <= radius {
                inner = Some(inner.map_or(value, |v| v.min(value)));
            } else if d > inner_limit && d <= outer_limit {
                rim.push(value);
            }
        }
        if rim.is_empty() {
            return None;
        }
        rim.sort_unstable();
        let surround = f64::from(rim[rim.len() / 2]);
        let inner = f64::from(inner?);
        (surround > inner).then(|| (inner + surround) / 2.0)
    }

    /// Re-cut `mask` at the rim midpoint of `coarse`; `None` if nothing survives
    fn refine(&self, blurred: &GrayImage, mask: &GrayImage, coarse: &Candidate) -> Option<Candidate> {
        let cut = Self::rim_cut(blurred, (coarse.center_x, coarse.center_y), coarse.diameter / 2.0)?;
        let tightened = mask_where(blurred, |x, y, value| mask.get_pixel(x, y).0[0] > 0 && f64::from(value) < cut);
        best_candidate(&tightened, &self.config, self.method(), 1.0)
    }
}

impl CandidateGenerator for AdaptiveThresholdGenerator {
    fn generate(&self, roi: &GrayImage) -> Option<Candidate> {
        let blurred = blur(roi, self.config.blur_sigma);
        if !has_contrast(&blurred) {
            return None;
        }
        let mask = self.mask(&blurred);
        let coarse = best_candidate(&mask, &self.config, self.method(), 1.0)?;
        Some(self.refine(&blurred, &mask, &coarse).unwrap_or(coarse))
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::AdaptiveThreshold
    }
}
