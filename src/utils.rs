//! Utility functions for image statistics and coordinate conversions.

pub mod image_conversion;
pub mod safe_cast;

use image::GrayImage;

/// Mean intensity of a grayscale buffer; `None` when empty
#[must_use]
#[allow(clippy::cast_precision_loss)] // Pixel counts stay far below f64 precision limits
pub fn mean_intensity(roi: &GrayImage) -> Option<f64> {
    let count = roi.as_raw().len();
    if count == 0 {
        return None;
    }
    let sum: u64 = roi.as_raw().iter().map(|&v| u64::from(v)).sum();
    Some(sum as f64 / count as f64)
}

/// 256-bin intensity histogram
#[must_use]
pub fn histogram(roi: &GrayImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &v in roi.as_raw() {
        bins[usize::from(v)] += 1;
    }
    bins
}

/// Smallest intensity `v` such that at least `fraction` of the pixels are `<= v`
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn intensity_percentile(roi: &GrayImage, fraction: f64) -> Option<u8> {
    let total = roi.as_raw().len();
    if total == 0 {
        return None;
    }
    let target = ((fraction.clamp(0.0, 1.0) * total as f64).ceil() as u64).max(1);
    let mut cumulative = 0u64;
    for (value, &count) in histogram(roi).iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return u8::try_from(value).ok();
        }
    }
    Some(u8::MAX)
}

/// Euclidean distance between two points
#[must_use]
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Value at the given fraction of an ascending-sorted slice (nearest rank)
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sorted_percentile(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted.get(rank.min(sorted.len() - 1)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_mean_intensity() {
        let img = GrayImage::from_fn(4, 1, |x, _| Luma([(x * 10) as u8]));
        assert_eq!(mean_intensity(&img), Some(15.0));
        assert_eq!(mean_intensity(&GrayImage::new(0, 0)), None);
    }

    #[test]
    fn test_intensity_percentile() {
        // 10 pixels with values 0..=9
        let img = GrayImage::from_fn(10, 1, |x, _| Luma([x as u8]));
        assert_eq!(intensity_percentile(&img, 0.2), Some(1));
        assert_eq!(intensity_percentile(&img, 1.0), Some(9));
        assert_eq!(intensity_percentile(&img, 0.0), Some(0));
    }

    #[test]
    fn test_sorted_percentile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sorted_percentile(&values, 0.0), Some(1.0));
        assert_eq!(sorted_percentile(&values, 0.5), Some(3.0));
        assert_eq!(sorted_percentile(&values, 1.0), Some(5.0));
        assert_eq!(sorted_percentile(&[], 0.5), None);
    }

    #[test]
    fn test_distance() {
        assert!((distance((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-12);
    }
}
