//! Darkest-region ray casting generator.
//!
//! Seeds at the darkest pixel of the blurred region (first in raster order),
//! grows that seed into the connected plateau of near-minimum pixels and casts
//! rays from the plateau centroid until the intensity rises by
//! `brightness_delta`. Works without any threshold, so it survives lighting
//! that defeats the binarising generators.

use super::components::has_contrast;
use super::{Candidate, CandidateGenerator, DetectionMethod};
use crate::config::DetectionConfig;
use crate::utils::{image_conversion::blur, mean_intensity, safe_cast::round_to_pixel};
use image::GrayImage;
use std::collections::VecDeque;
use std::f64::consts::TAU;

/// Radial ray casting from the darkest plateau
pub struct DarkestRegionGenerator {
    config: DetectionConfig,
}

/// Where one ray stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the origin at which the ray stopped
    pub radius: f64,
    /// Whether the ray crossed the brightness limit (false: hit the border)
    pub crossed: bool,
}

impl DarkestRegionGenerator {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Cast `ray_count` rays from `origin` at unit steps until a pixel exceeds `limit`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cast_rays(&self, blurred: &GrayImage, origin: (f64, f64), limit: f64) -> Vec<RayHit> {
        let (width, height) = blurred.dimensions();
        let ray_count = self.config.darkest.ray_count.max(1);
        let max_steps = width.max(height);

        (0..ray_count)
            .map(|i| {
                let angle = TAU * i as f64 / ray_count as f64;
                let (dx, dy) = (angle.cos(), angle.sin());
                let mut last = 0.0;
                for step in 1..=max_steps {
                    let r = f64::from(step);
                    let (px, py) = (origin.0 + dx * r, origin.1 + dy * r);
                    if px < -0.5 || py < -0.5 || px > f64::from(width) - 0.5 || py > f64::from(height) - 0.5 {
                        break;
                    }
                    let (Some(x), Some(y)) = (round_to_pixel(px, width), round_to_pixel(py, height)) else {
                        break;
                    };
                    if f64::from(blurred.get_pixel(x, y).0[0]) > limit {
                        return RayHit { radius: r, crossed: true };
                    }
                    last = r;
                }
                RayHit { radius: last, crossed: false }
            })
            .collect()
    }
}

/// First minimum-intensity pixel in raster order
fn darkest_pixel(blurred: &GrayImage) -> Option<(u32, u32, u8)> {
    let mut best: Option<(u32, u32, u8)> = None;
    for (x, y, pixel) in blurred.enumerate_pixels() {
        let value = pixel.0[0];
        if best.map_or(true, |(_, _, v)| value < v) {
            best = Some((x, y, value));
        }
    }
    best
}

/// Centroid of the 4-connected plateau around `seed` whose pixels stay within
/// `tolerance` of the seed intensity
#[allow(clippy::cast_precision_loss)]
fn plateau_centroid(blurred: &GrayImage, seed: (u32, u32), tolerance: u8) -> (f64, f64) {
    let (width, height) = blurred.dimensions();
    let ceiling = blurred.get_pixel(seed.0, seed.1).0[0].saturating_add(tolerance);
    let mut visited = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::from([seed]);
    visited[seed.1 as usize * width as usize + seed.0 as usize] = true;

    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    while let Some((x, y)) = queue.pop_front() {
        sum_x += f64::from(x);
        sum_y += f64::from(y);
        count += 1;

        let neighbours = [
            (x.checked_sub(1), Some(y)),
            (Some(x + 1).filter(|&nx| nx < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), Some(y + 1).filter(|&ny| ny < height)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else { continue };
            let idx = ny as usize * width as usize + nx as usize;
            if !visited[idx] && blurred.get_pixel(nx, ny).0[0] <= ceiling {
                visited[idx] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    (sum_x / count as f64, sum_y / count as f64)
}

impl CandidateGenerator for DarkestRegionGenerator {
    fn generate(&self, roi: &GrayImage) -> Option<Candidate> {
        let blurred = blur(roi, self.config.blur_sigma);
        if !has_contrast(&blurred) {
            return None;
        }
        let (sx, sy, seed_value) = darkest_pixel(&blurred)?;
        let origin = plateau_centroid(&blurred, (sx, sy), self.config.darkest.core_tolerance);
        let center_value = f64::from(seed_value);

        let hits = self.cast_rays(&blurred, origin, center_value + self.config.darkest.brightness_delta);
        let crossed = hits.iter().filter(|h| h.crossed).count();
        if crossed * 2 < hits.len() {
            return None;
        }

        let max_radius = hits.iter().map(|h| h.radius).fold(0.0, f64::max);
        let min_radius = hits.iter().map(|h| h.radius).fold(f64::INFINITY, f64::min);
        let diameter = 2.0 * max_radius;
        if max_radius <= 0.0 || !self.config.diameter_in_range(diameter) {
            return None;
        }

        let mean = mean_intensity(&blurred)?;
        let confidence = if mean > 0.0 { ((mean - center_value) / mean).clamp(0.0, 1.0) } else { 0.0 };

        Some(Candidate {
            center_x: origin.0,
            center_y: origin.1,
            diameter,
            confidence,
            circularity: (min_radius / max_radius).clamp(0.0, 1.0),
            method: self.method(),
        })
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::DarkestRegion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn disk_roi(size: u32, center: (f64, f64), radius: f64) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (f64::from(x) - center.0).hypot(f64::from(y) - center.1) <= radius {
                Luma([30])
            } else {
                Luma([200])
            }
        })
    }

    #[test]
    fn test_recovers_disk() {
        let generator = DarkestRegionGenerator::new(DetectionConfig::default());
        let candidate = generator.generate(&disk_roi(60, (31.0, 27.0), 10.0)).unwrap();

        assert!((candidate.center_x - 31.0).abs() < 1.0);
        assert!((candidate.center_y - 27.0).abs() < 1.0);
        assert!((candidate.diameter - 20.0).abs() < 3.0, "diameter {}", candidate.diameter);
        assert!(candidate.confidence > 0.7);
        assert!(candidate.circularity > 0.7);
    }

    #[test]
    fn test_darkest_pixel_prefers_first_in_raster_order() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([100]));
        img.put_pixel(7, 2, Luma([5]));
        img.put_pixel(1, 6, Luma([5]));
        assert_eq!(darkest_pixel(&img), Some((7, 2, 5)));
    }

    #[test]
    fn test_rays_stop_at_border_without_crossing() {
        let generator = DarkestRegionGenerator::new(DetectionConfig::default());
        let img = GrayImage::from_pixel(21, 21, Luma([50]));
        let hits = generator.cast_rays(&img, (10.0, 10.0), 75.0);

        assert_eq!(hits.len(), 16);
        assert!(hits.iter().all(|h| !h.crossed));
        assert!(hits.iter().all(|h| h.radius >= 10.0 && h.radius <= 15.0));
    }

    #[test]
    fn test_open_dark_area_is_rejected() {
        // Dark left half: most rays run into the border before brightening
        let roi = GrayImage::from_fn(40, 40, |x, _| if x < 30 { Luma([20]) } else { Luma([200]) });
        assert!(DarkestRegionGenerator::new(DetectionConfig::default()).generate(&roi).is_none());
    }
}
