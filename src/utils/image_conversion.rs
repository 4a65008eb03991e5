//! Conversions from caller frames into the grayscale buffers the generators analyse.

use crate::{frame::Frame, region::EyeRegion};
use image::{GrayImage, Luma};

/// Convert an RGB triple to 8-bit luma (Rec. 709 weights, matching `image`)
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Weighted sum of u8 stays in 0..=255
pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    let luma = 0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b);
    luma.round().clamp(0.0, 255.0) as u8
}

/// Copy the pixels inside `region` into an owned grayscale buffer
///
/// The region must already be clamped to the frame; pixels outside it read as 0.
#[must_use]
pub fn crop_gray<F: Frame + ?Sized>(frame: &F, region: &EyeRegion) -> GrayImage {
    let (fw, fh) = (frame.width(), frame.height());
    GrayImage::from_fn(region.width, region.height, |x, y| {
        let (px, py) = (region.x + x, region.y + y);
        if px < fw && py < fh {
            Luma([frame.intensity(px, py)])
        } else {
            Luma([0])
        }
    })
}

/// Light gaussian pre-blur; a non-positive sigma returns a copy
#[must_use]
pub fn blur(roi: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(roi, sigma)
    } else {
        roi.clone()
    }
}
