//! Normalized facial landmarks and eye selection.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized (0..1) landmark coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Landmark {
    /// Horizontal position as a fraction of frame width
    pub x: f64,
    /// Vertical position as a fraction of frame height
    pub y: f64,
}

impl Landmark {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pixel coordinates for a frame of the given size
    #[must_use]
    pub fn to_pixels(self, width: u32, height: u32) -> (f64, f64) {
        (self.x * f64::from(width), self.y * f64::from(height))
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Landmark {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Landmark> for [f64; 2] {
    fn from(point: Landmark) -> Self {
        [point.x, point.y]
    }
}

/// Ordered landmark collection for one frame, as produced by the face tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    #[must_use]
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark at `index`, treating out-of-range or non-finite points as absent
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied().filter(|p| p.is_finite())
    }

    /// All landmarks for the given indices, or `None` if any is absent
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Option<Vec<Landmark>> {
        if indices.is_empty() {
            return None;
        }
        indices.iter().map(|&i| self.get(i)).collect()
    }

    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

/// One eye of the tracked subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Lowercase label used in logs and serialized output
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which eyes to process on a `detect` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeMode {
    Left,
    Right,
    #[default]
    Both,
}

impl EyeMode {
    /// Eyes covered by this mode, left first
    #[must_use]
    pub fn eyes(self) -> &'static [Eye] {
        match self {
            Self::Left => &[Eye::Left],
            Self::Right => &[Eye::Right],
            Self::Both => &[Eye::Left, Eye::Right],
        }
    }
}

impl FromStr for EyeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            "both" | "lr" => Ok(Self::Both),
            _ => Err(Error::InvalidInput(format!("Unknown eye mode: {s}"))),
        }
    }
}

impl fmt::Display for EyeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
        })
    }
}
