//! Gradient centroid generator.
//!
//! Strong edges around a dark disk surround its center. The dark-weighted
//! centroid of the thinned edge pixels estimates that center and a high
//! percentile of their distances estimates the radius.

use super::components::has_contrast;
use super::edges::{edge_points, EdgePoint};
use super::{Candidate, CandidateGenerator, DetectionMethod};
use crate::config::DetectionConfig;
use crate::utils::{distance, image_conversion::blur, sorted_percentile};
use image::GrayImage;

/// Fewer edge pixels than this cannot outline a pupil
pub const MIN_EDGE_POINTS: usize = 8;

/// Dark-weighted centroid of strong gradient pixels
pub struct GradientCentroidGenerator {
    config: DetectionConfig,
}

impl GradientCentroidGenerator {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }
}

/// Centroid of edge pixels weighted by `255 - intensity`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dark_weighted_centroid(blurred: &GrayImage, edges: &[EdgePoint]) -> Option<(f64, f64)> {
    let (mut sum_x, mut sum_y, mut total) = (0.0, 0.0, 0.0);
    for edge in edges {
        let weight = 255.0 - f64::from(blurred.get_pixel(edge.x as u32, edge.y as u32).0[0]);
        sum_x += weight * edge.x;
        sum_y += weight * edge.y;
        total += weight;
    }
    (total > 0.0).then(|| (sum_x / total, sum_y / total))
}

impl CandidateGenerator for GradientCentroidGenerator {
    #[allow(clippy::cast_precision_loss)]
    fn generate(&self, roi: &GrayImage) -> Option<Candidate> {
        let blurred = blur(roi, self.config.blur_sigma);
        if !has_contrast(&blurred) {
            return None;
        }
        let gradient = &self.config.gradient;
        let edges = edge_points(&blurred, gradient.threshold);
        if edges.len() < MIN_EDGE_POINTS {
            return None;
        }

        let center = dark_weighted_centroid(&blurred, &edges)?;
        let mut distances: Vec<f64> = edges.iter().map(|e| distance((e.x, e.y), center)).collect();
        distances.sort_by(f64::total_cmp);
        let radius = sorted_percentile(&distances, gradient.radius_percentile)?;
        let diameter = 2.0 * radius;
        if radius <= 0.0 || !self.config.diameter_in_range(diameter) {
            return None;
        }

        let outward = edges.iter().filter(|e| e.faces_away_from(center)).count();
        let confidence = outward as f64 / edges.len() as f64;

        let mean = distances.iter().sum::<f64>() / distances.len() as f64;
        let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / distances.len() as f64;
        let circularity = if mean > 0.0 { 1.0 - variance.sqrt() / mean } else { 0.0 };

        Some(Candidate {
            center_x: center.0,
            center_y: center.1,
            diameter,
            confidence: confidence.clamp(0.0, 1.0),
            circularity: circularity.clamp(0.0, 1.0),
            method: self.method(),
        })
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::GradientCentroid
    }
}
