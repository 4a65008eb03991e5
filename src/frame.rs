//! Read-only pixel access for video frames.
//!
//! The engine never owns frame data. Anything that can report its size and an
//! 8-bit intensity per pixel can be fed to [`crate::engine::PupilEngine::detect`].

use crate::utils::image_conversion::rgb_to_luma;
use image::{DynamicImage, GenericImageView, GrayImage, Pixel, RgbImage};

/// Intensity accessor over a caller-owned frame
pub trait Frame {
    /// Frame width in pixels
    fn width(&self) -> u32;

    /// Frame height in pixels
    fn height(&self) -> u32;

    /// 8-bit intensity at `(x, y)`; callers stay within `width × height`
    fn intensity(&self, x: u32, y: u32) -> u8;

    /// Whether the frame can be read at all
    fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }
}

impl Frame for GrayImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn intensity(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).0[0]
    }
}

impl Frame for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn intensity(&self, x: u32, y: u32) -> u8 {
        let [r, g, b] = self.get_pixel(x, y).0;
        rgb_to_luma(r, g, b)
    }
}

impl Frame for DynamicImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn intensity(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y).to_luma().0[0]
    }
}

/// Borrowed interleaved pixel buffer (1 = gray, 3 = RGB, 4 = RGBA)
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    width: u32,
    height: u32,
    channels: usize,
    data: &'a [u8],
}

impl<'a> RawFrame<'a> {
    /// Wrap a raw row-major buffer.
    ///
    /// The buffer is not validated here; [`Frame::is_valid`] reports whether
    /// it is large enough for the declared geometry.
    #[must_use]
    pub fn new(width: u32, height: u32, channels: usize, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Number of interleaved channels per pixel
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    fn required_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.channels)
    }
}

impl Frame for RawFrame<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn intensity(&self, x: u32, y: u32) -> u8 {
        let offset = (y as usize * self.width as usize + x as usize) * self.channels;
        match (self.channels, self.data.get(offset..offset + self.channels)) {
            (1, Some(px)) => px[0],
            (3 | 4, Some(px)) => rgb_to_luma(px[0], px[1], px[2]),
            _ => 0,
        }
    }

    fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && matches!(self.channels, 1 | 3 | 4)
            && self.required_len().is_some_and(|len| self.data.len() >= len)
    }
}
