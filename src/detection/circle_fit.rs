//! Radial-symmetry voting followed by a least-squares circle fit.
//!
//! Every edge pixel votes along its gradient toward the dark side for all
//! radii in the plausible range. The accumulator peak seeds the fit: edge
//! pixels at the dominant distance from the peak are fitted algebraically
//! (Kåsa), the inlier band is recomputed around the fitted circle and the
//! fit is repeated once.

use super::components::has_contrast;
use super::edges::{edge_points, EdgePoint};
use super::{Candidate, CandidateGenerator, DetectionMethod};
use crate::config::DetectionConfig;
use crate::utils::{distance, image_conversion::blur};
use image::GrayImage;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::TAU;

/// Half-width of the distance band that counts as on-circle (pixels)
pub const INLIER_BAND: f64 = 2.0;

/// Angular sectors used for the coverage check
pub const COVERAGE_SECTORS: usize = 8;

/// Inliers must populate at least this many sectors
pub const MIN_COVERED_SECTORS: usize = 6;

/// A fitted circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: (f64, f64),
    pub radius: f64,
}

impl Circle {
    /// Mean absolute radial distance of the points from the circle
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_residual(&self, points: &[(f64, f64)]) -> f64 {
        if points.is_empty() {
            return f64::INFINITY;
        }
        points
            .iter()
            .map(|&p| (distance(p, self.center) - self.radius).abs())
            .sum::<f64>()
            / points.len() as f64
    }
}

/// Algebraic (Kåsa) least-squares circle through `points`.
///
/// Solves `x² + y² + D·x + E·y + F = 0` in a frame centered on the point
/// mean. Returns `None` for fewer than three points, a singular system or a
/// non-finite radius.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit_circle(points: &[(f64, f64)]) -> Option<Circle> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut normal = Matrix3::<f64>::zeros();
    let mut rhs = Vector3::<f64>::zeros();
    for &(px, py) in points {
        let (x, y) = (px - mean_x, py - mean_y);
        let row = Vector3::new(x, y, 1.0);
        normal += row * row.transpose();
        rhs -= row * (x * x + y * y);
    }

    let solution = normal.lu().solve(&rhs)?;
    let (cx, cy) = (-solution[0] / 2.0, -solution[1] / 2.0);
    let radius_sq = cx * cx + cy * cy - solution[2];
    if !radius_sq.is_finite() || radius_sq <= 0.0 {
        return None;
    }
    Some(Circle { center: (cx + mean_x, cy + mean_y), radius: radius_sq.sqrt() })
}

/// Number of angular sectors around `center` containing at least one point
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn covered_sectors(points: &[(f64, f64)], center: (f64, f64)) -> usize {
    let mut hit = [false; COVERAGE_SECTORS];
    for &(x, y) in points {
        let angle = (y - center.1).atan2(x - center.0).rem_euclid(TAU);
        let sector = ((angle / TAU * COVERAGE_SECTORS as f64) as usize).min(COVERAGE_SECTORS - 1);
        hit[sector] = true;
    }
    hit.iter().filter(|&&h| h).count()
}

/// Radial-symmetry voting plus Kåsa refinement
pub struct CircleFitGenerator {
    config: DetectionConfig,
}

impl CircleFitGenerator {
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Integer radius range searched for a region of the given size
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn radius_range(&self, width: u32, height: u32) -> (u32, u32) {
        let min_r = (self.config.min_diameter / 2.0).floor().max(1.0) as u32;
        let max_r = ((self.config.max_diameter / 2.0).ceil() as u32).min(width.min(height) / 2);
        (min_r, max_r)
    }

    /// Accumulator peak of gradient-direction votes, first in raster order on ties
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn vote_center(&self, edges: &[EdgePoint], width: u32, height: u32) -> Option<(f64, f64)> {
        let (min_r, max_r) = self.radius_range(width, height);
        if min_r > max_r {
            return None;
        }
        let mut accumulator = vec![0u32; width as usize * height as usize];
        for edge in edges {
            let (ux, uy) = (-edge.gx / edge.magnitude, -edge.gy / edge.magnitude);
            for r in min_r..=max_r {
                let vx = (edge.x + ux * f64::from(r)).round();
                let vy = (edge.y + uy * f64::from(r)).round();
                if vx < 0.0 || vy < 0.0 || vx >= f64::from(width) || vy >= f64::from(height) {
                    break;
                }
                accumulator[vy as usize * width as usize + vx as usize] += 1;
            }
        }

        let (index, &votes) = accumulator
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &u32)>, (i, v)| match best {
                Some((_, b)) if v <= b => best,
                _ => Some((i, v)),
            })?;
        if votes == 0 {
            return None;
        }
        let stride = width as usize;
        Some(((index % stride) as f64, (index / stride) as f64))
    }

    /// Edge pixels at the most common rounded distance from `center`, within the inlier band
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn dominant_ring(points: &[(f64, f64)], center: (f64, f64)) -> Vec<(f64, f64)> {
        let distances: Vec<f64> = points.iter().map(|&p| distance(p, center)).collect();
        let mut bins: Vec<usize> = Vec::new();
        for d in &distances {
            let bin = d.round() as usize;
            if bin >= bins.len() {
                bins.resize(bin + 1, 0);
            }
            bins[bin] += 1;
        }
        let mode = bins
            .iter()
            .enumerate()
            .fold((0, 0), |(best_bin, best), (bin, &count)| if count > best { (bin, count) } else { (best_bin, best) })
            .0;

        let ring_radius = mode as f64;
        points
            .iter()
            .zip(&distances)
            .filter(|(_, d)| (*d - ring_radius).abs() <= INLIER_BAND)
            .map(|(&p, _)| p)
            .collect()
    }
}

impl CandidateGenerator for CircleFitGenerator {
    #[allow(clippy::cast_precision_loss)]
    fn generate(&self, roi: &GrayImage) -> Option<Candidate> {
        let blurred = blur(roi, self.config.blur_sigma);
        if !has_contrast(&blurred) {
            return None;
        }
        let settings = &self.config.circle_fit;
        let edges = edge_points(&blurred, settings.edge_threshold);
        if edges.len() < settings.min_inliers {
            return None;
        }
        let (width, height) = blurred.dimensions();
        let voted = self.vote_center(&edges, width, height)?;

        let points: Vec<(f64, f64)> = edges.iter().map(|e| (e.x, e.y)).collect();
        let ring = Self::dominant_ring(&points, voted);
        let first = fit_circle(&ring)?;

        let inliers: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|&p| (distance(p, first.center) - first.radius).abs() <= INLIER_BAND)
            .collect();
        let circle = fit_circle(&inliers)?;

        if inliers.len() < settings.min_inliers {
            return None;
        }
        let residual = circle.mean_residual(&inliers);
        if !residual.is_finite() || residual >= settings.max_residual {
            return None;
        }
        let coverage = covered_sectors(&inliers, circle.center);
        if coverage < MIN_COVERED_SECTORS {
            return None;
        }
        let diameter = 2.0 * circle.radius;
        if !self.config.diameter_in_range(diameter) {
            return None;
        }

        let inlier_fraction = inliers.len() as f64 / points.len() as f64;
        let confidence = (1.0 - residual / settings.max_residual) * inlier_fraction;

        Some(Candidate {
            center_x: circle.center.0,
            center_y: circle.center.1,
            diameter,
            confidence: confidence.clamp(0.0, 1.0),
            circularity: coverage as f64 / COVERAGE_SECTORS as f64,
            method: self.method(),
        })
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::CircleFit
    }
}
