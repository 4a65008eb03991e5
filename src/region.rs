//! Landmark-guided eye region extraction.

use crate::config::{LandmarkConfig, RegionConfig};
use crate::landmarks::{Eye, LandmarkSet};
use crate::utils::{distance, safe_cast::f64_to_u32_clamp};
use serde::{Deserialize, Serialize};

/// Pixel rectangle around one eye, clamped to the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl EyeRegion {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Translate a region-relative point into frame coordinates
    #[must_use]
    pub fn to_frame(&self, local_x: f64, local_y: f64) -> (f64, f64) {
        (f64::from(self.x) + local_x, f64::from(self.y) + local_y)
    }
}

/// Derives eye regions from iris landmarks
#[derive(Debug, Clone)]
pub struct RegionExtractor {
    region: RegionConfig,
    landmarks: LandmarkConfig,
}

impl RegionExtractor {
    #[must_use]
    pub fn new(region: RegionConfig, landmarks: LandmarkConfig) -> Self {
        Self { region, landmarks }
    }

    /// Compute the region for one eye.
    ///
    /// Returns `None` when the eye's landmarks are absent or the clamped
    /// region is no larger than the configured minimum.
    #[must_use]
    pub fn extract(&self, landmarks: &LandmarkSet, eye: Eye, width: u32, height: u32) -> Option<EyeRegion> {
        if width == 0 || height == 0 {
            return None;
        }
        let points: Vec<(f64, f64)> = landmarks
            .subset(self.landmarks.indices(eye))?
            .into_iter()
            .map(|p| p.to_pixels(width, height))
            .collect();

        #[allow(clippy::cast_precision_loss)] // A handful of landmarks
        let n = points.len() as f64;
        let centroid = (
            points.iter().map(|p| p.0).sum::<f64>() / n,
            points.iter().map(|p| p.1).sum::<f64>() / n,
        );
        let iris_radius = points
            .iter()
            .map(|&p| distance(p, centroid))
            .fold(0.0, f64::max);

        let half = (iris_radius * self.region.scale).mul_add(0.5, self.region.padding);
        let left = f64_to_u32_clamp((centroid.0 - half).floor(), 0, width);
        let top = f64_to_u32_clamp((centroid.1 - half).floor(), 0, height);
        let right = f64_to_u32_clamp((centroid.0 + half).ceil(), 0, width);
        let bottom = f64_to_u32_clamp((centroid.1 + half).ceil(), 0, height);

        let region_width = right.saturating_sub(left);
        let region_height = bottom.saturating_sub(top);
        if region_width <= self.region.min_size || region_height <= self.region.min_size {
            log::debug!(
                "Degenerate {eye} eye region {region_width}x{region_height} at ({left}, {top})"
            );
            return None;
        }

        Some(EyeRegion::new(left, top, region_width, region_height))
    }
}
