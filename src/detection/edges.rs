//! Gradient edges for the edge-based generators.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// tan(22.5°), boundary between axis-aligned and diagonal gradient sectors
const TAN_22_5: f64 = 0.414_213_562_373_095;

/// An edge pixel with its Sobel gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub x: f64,
    pub y: f64,
    /// Horizontal gradient (positive toward brighter pixels on the right)
    pub gx: f64,
    /// Vertical gradient (positive toward brighter pixels below)
    pub gy: f64,
    pub magnitude: f64,
}

impl EdgePoint {
    /// Whether the gradient points away from `center`, i.e. the dark side faces it
    #[must_use]
    pub fn faces_away_from(&self, center: (f64, f64)) -> bool {
        (self.x - center.0) * self.gx + (self.y - center.1) * self.gy > 0.0
    }
}

/// Thin edges: Sobel magnitude above `relative_threshold × max`, kept only at
/// local maxima along the quantised gradient direction. Border pixels are
/// skipped. Returned in raster order.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn edge_points(blurred: &GrayImage, relative_threshold: f64) -> Vec<EdgePoint> {
    let (width, height) = blurred.dimensions();
    if width < 3 || height < 3 {
        return Vec::new();
    }
    let gx = horizontal_sobel(blurred);
    let gy = vertical_sobel(blurred);
    let stride = width as usize;

    let magnitude: Vec<f64> = gx
        .as_raw()
        .iter()
        .zip(gy.as_raw())
        .map(|(&dx, &dy)| f64::from(dx).hypot(f64::from(dy)))
        .collect();
    let max_magnitude = magnitude.iter().copied().fold(0.0, f64::max);
    if max_magnitude <= f64::EPSILON {
        return Vec::new();
    }
    let threshold = relative_threshold * max_magnitude;

    let mut points = Vec::new();
    for y in 1..height as usize - 1 {
        for x in 1..stride - 1 {
            let idx = y * stride + x;
            let mag = magnitude[idx];
            if mag < threshold || mag <= f64::EPSILON {
                continue;
            }
            let dx = f64::from(gx.as_raw()[idx]);
            let dy = f64::from(gy.as_raw()[idx]);

            let (sx, sy): (isize, isize) = if dy.abs() <= TAN_22_5 * dx.abs() {
                (1, 0)
            } else if dx.abs() <= TAN_22_5 * dy.abs() {
                (0, 1)
            } else if dx * dy > 0.0 {
                (1, 1)
            } else {
                (1, -1)
            };
            let forward = (y as isize + sy) as usize * stride + (x as isize + sx) as usize;
            let backward = (y as isize - sy) as usize * stride + (x as isize - sx) as usize;
            if mag >= magnitude[forward] && mag > magnitude[backward] {
                points.push(EdgePoint {
                    x: x as f64,
                    y: y as f64,
                    gx: dx,
                    gy: dy,
                    magnitude: mag,
                });
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_vertical_step_produces_single_column() {
        let img = GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([20]) } else { Luma([220]) });
        let edges = edge_points(&img, 0.3);
        assert!(!edges.is_empty());

        let first_x = edges[0].x;
        assert!(edges.iter().all(|e| (e.x - first_x).abs() < f64::EPSILON), "edge is one pixel wide");
        assert!(edges.iter().all(|e| e.gx > 0.0 && e.gy.abs() < 1e-9));
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = GrayImage::from_pixel(16, 16, Luma([128]));
        assert!(edge_points(&img, 0.1).is_empty());
        assert!(edge_points(&GrayImage::new(2, 2), 0.1).is_empty());
    }

    #[test]
    fn test_faces_away_from_dark_center() {
        let point = EdgePoint { x: 15.0, y: 10.0, gx: 5.0, gy: 0.0, magnitude: 5.0 };
        assert!(point.faces_away_from((10.0, 10.0)));
        assert!(!point.faces_away_from((20.0, 10.0)));
    }
}
