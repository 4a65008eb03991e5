//! Connected-component statistics shared by the threshold generators.
//!
//! A binary mask (foreground = non-zero) is labelled with 8-connectivity.
//! Each component reports its area, first-moment centroid and a perimeter
//! estimate; the best-scoring component becomes the generator's candidate.

use super::{Candidate, DetectionMethod};
use crate::config::{ComponentConfig, DetectionConfig};
use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::f64::consts::PI;

/// Minimum intensity spread a region needs before thresholding means anything
pub const MIN_REGION_CONTRAST: u8 = 10;

/// Statistics of one labelled component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    /// Component label (1-based)
    pub label: u32,
    /// Pixel count
    pub area: usize,
    /// Boundary length estimate (pixels)
    pub perimeter: f64,
    /// First-moment centroid (pixel coordinates)
    pub centroid: (f64, f64),
}

impl Blob {
    /// `4π·area / perimeter²`, clamped to [0, 1]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn circularity(&self) -> f64 {
        if self.perimeter <= 0.0 {
            return 0.0;
        }
        (4.0 * PI * self.area as f64 / (self.perimeter * self.perimeter)).clamp(0.0, 1.0)
    }

    /// Diameter of the disk with the same area
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn equivalent_diameter(&self) -> f64 {
        2.0 * (self.area as f64 / PI).sqrt()
    }
}

#[derive(Default, Clone, Copy)]
struct Accumulator {
    area: usize,
    sum_x: f64,
    sum_y: f64,
    cracks: usize,
}

/// Whether the region has enough intensity spread to threshold
#[must_use]
pub fn has_contrast(roi: &GrayImage) -> bool {
    let raw = roi.as_raw();
    match (raw.iter().min(), raw.iter().max()) {
        (Some(&lo), Some(&hi)) => hi - lo >= MIN_REGION_CONTRAST,
        _ => false,
    }
}

/// Build a mask flagging pixels for which `predicate(x, y, value)` holds
#[must_use]
pub fn mask_where<F>(roi: &GrayImage, predicate: F) -> GrayImage
where
    F: Fn(u32, u32, u8) -> bool,
{
    GrayImage::from_fn(roi.width(), roi.height(), |x, y| {
        if predicate(x, y, roi.get_pixel(x, y).0[0]) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Label the mask and collect per-component statistics, ordered by label.
///
/// The perimeter is the number of pixel edges separating the component from
/// anything else, scaled by π/4 to undo the staircase overestimate.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn label_blobs(mask: &GrayImage) -> Vec<Blob> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let label_at = |x: i64, y: i64| -> u32 {
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            0
        } else {
            labels.get_pixel(x as u32, y as u32).0[0]
        }
    };

    let mut stats: Vec<Accumulator> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let label = labels.get_pixel(x, y).0[0];
            if label == 0 {
                continue;
            }
            let slot = label as usize - 1;
            if slot >= stats.len() {
                stats.resize(slot + 1, Accumulator::default());
            }
            let (xi, yi) = (i64::from(x), i64::from(y));
            let cracks = [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .iter()
                .filter(|(dx, dy)| label_at(xi + dx, yi + dy) != label)
                .count();

            let acc = &mut stats[slot];
            acc.area += 1;
            acc.sum_x += f64::from(x);
            acc.sum_y += f64::from(y);
            acc.cracks += cracks;
        }
    }

    stats
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.area > 0)
        .map(|(slot, acc)| Blob {
            label: u32::try_from(slot + 1).unwrap_or(u32::MAX),
            area: acc.area,
            perimeter: acc.cracks as f64 * PI / 4.0,
            centroid: (acc.sum_x / acc.area as f64, acc.sum_y / acc.area as f64),
        })
        .collect()
}

/// Proximity of a point to the region center: 1 at the center, 0 at a corner
#[must_use]
pub fn central_proximity(point: (f64, f64), width: u32, height: u32) -> f64 {
    let (w, h) = (f64::from(width), f64::from(height));
    let half_diagonal = w.hypot(h) / 2.0;
    if half_diagonal <= 0.0 {
        return 0.0;
    }
    let center = ((w - 1.0) / 2.0, (h - 1.0) / 2.0);
    let offset = (point.0 - center.0).hypot(point.1 - center.1);
    (1.0 - offset / half_diagonal).clamp(0.0, 1.0)
}

/// Score every acceptable component of the mask and return the best one.
///
/// Components outside the area range, below the circularity floor or with an
/// out-of-range diameter are discarded. Confidence is the weighted mean of
/// circularity and central proximity, times `confidence_scale`. Ties keep the
/// lower label.
#[must_use]
pub fn best_candidate(
    mask: &GrayImage,
    config: &DetectionConfig,
    method: DetectionMethod,
    confidence_scale: f64,
) -> Option<Candidate> {
    let (width, height) = mask.dimensions();
    let components = &config.components;
    let mut best: Option<Candidate> = None;

    for blob in label_blobs(mask) {
        if !area_accepted(blob.area, components) {
            continue;
        }
        let circularity = blob.circularity();
        if circularity < components.min_circularity {
            continue;
        }
        let diameter = blob.equivalent_diameter();
        if !config.diameter_in_range(diameter) {
            continue;
        }

        let proximity = central_proximity(blob.centroid, width, height);
        let confidence = weighted_confidence(circularity, proximity, components) * confidence_scale;
        let candidate = Candidate {
            center_x: blob.centroid.0,
            center_y: blob.centroid.1,
            diameter,
            confidence: confidence.clamp(0.0, 1.0),
            circularity,
            method,
        };
        if best.map_or(true, |b| candidate.confidence > b.confidence) {
            best = Some(candidate);
        }
    }

    best
}

/// Whether an area lies in the configured `[min_area, max_area]` range
#[must_use]
pub fn area_accepted(area: usize, components: &ComponentConfig) -> bool {
    area >= components.min_area && area <= components.max_area
}

fn weighted_confidence(circularity: f64, proximity: f64, components: &ComponentConfig) -> f64 {
    let total = components.circularity_weight + components.centrality_weight;
    if total <= 0.0 {
        return circularity;
    }
    (components.circularity_weight * circularity + components.centrality_weight * proximity) / total
}
