//! Pupil candidate generators.
//!
//! Each generator analyses one grayscale eye region and proposes at most one
//! [`Candidate`]. Generators hold only their configuration, so the same input
//! always yields the same output and the ensemble can run in any order.

/// Adaptive local threshold with connected-component scoring
pub mod adaptive;

/// Radial voting followed by an algebraic circle fit
pub mod circle_fit;

/// Connected-component labelling and shape statistics
pub mod components;

/// Threshold relative to the region mean
pub mod contrast;

/// Ray expansion from the darkest plateau
pub mod darkest;

/// Sobel edges with non-maximum suppression
pub mod edges;

/// Otsu threshold over the whole region
pub mod global;

/// Dark-weighted centroid of strong edges
pub mod gradient;

use crate::config::DetectionConfig;
use crate::{Error, Result};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which heuristic produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    AdaptiveThreshold,
    GlobalThreshold,
    DarkestRegion,
    ContrastThreshold,
    GradientCentroid,
    CircleFit,
}

impl DetectionMethod {
    /// Every method, in default ensemble order
    pub const ALL: [Self; 6] = [
        Self::AdaptiveThreshold,
        Self::GlobalThreshold,
        Self::DarkestRegion,
        Self::ContrastThreshold,
        Self::GradientCentroid,
        Self::CircleFit,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AdaptiveThreshold => "adaptive_threshold",
            Self::GlobalThreshold => "global_threshold",
            Self::DarkestRegion => "darkest_region",
            Self::ContrastThreshold => "contrast_threshold",
            Self::GradientCentroid => "gradient_centroid",
            Self::CircleFit => "circle_fit",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "adaptive" | "adaptive_threshold" => Ok(Self::AdaptiveThreshold),
            "global" | "otsu" | "global_threshold" => Ok(Self::GlobalThreshold),
            "darkest" | "darkest_region" => Ok(Self::DarkestRegion),
            "contrast" | "contrast_threshold" => Ok(Self::ContrastThreshold),
            "gradient" | "gradient_centroid" => Ok(Self::GradientCentroid),
            "circle" | "hough" | "circle_fit" => Ok(Self::CircleFit),
            _ => Err(Error::DetectionError(format!("Unknown generator: {s}"))),
        }
    }
}

/// One generator's pupil proposal, in region-relative pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Horizontal center within the region
    pub center_x: f64,
    /// Vertical center within the region
    pub center_y: f64,
    /// Pupil diameter (pixels)
    pub diameter: f64,
    /// Plausibility in [0, 1]
    pub confidence: f64,
    /// Shape roundness in [0, 1]
    pub circularity: f64,
    /// Producing heuristic
    pub method: DetectionMethod,
}

/// Trait for all candidate generators
pub trait CandidateGenerator: Send + Sync {
    /// Analyse a grayscale eye region and propose at most one pupil
    fn generate(&self, roi: &GrayImage) -> Option<Candidate>;

    /// Heuristic implemented by this generator
    fn method(&self) -> DetectionMethod;

    /// Get generator name
    fn name(&self) -> &str {
        self.method().name()
    }
}

/// Create a generator by method, using the given detection parameters
#[must_use]
pub fn create_generator(method: DetectionMethod, config: &DetectionConfig) -> Box<dyn CandidateGenerator> {
    match method {
        DetectionMethod::AdaptiveThreshold => Box::new(adaptive::AdaptiveThresholdGenerator::new(config.clone())),
        DetectionMethod::GlobalThreshold => Box::new(global::GlobalThresholdGenerator::new(config.clone())),
        DetectionMethod::DarkestRegion => Box::new(darkest::DarkestRegionGenerator::new(config.clone())),
        DetectionMethod::ContrastThreshold => Box::new(contrast::ContrastThresholdGenerator::new(config.clone())),
        DetectionMethod::GradientCentroid => Box::new(gradient::GradientCentroidGenerator::new(config.clone())),
        DetectionMethod::CircleFit => Box::new(circle_fit::CircleFitGenerator::new(config.clone())),
    }
}

/// Create a generator by name ("adaptive", "otsu", "darkest", ...)
///
/// # Errors
///
/// Returns `Error::DetectionError` for an unknown name
pub fn create_generator_by_name(name: &str, config: &DetectionConfig) -> Result<Box<dyn CandidateGenerator>> {
    Ok(create_generator(name.parse()?, config))
}

/// Build the configured ensemble, preserving configuration order
#[must_use]
pub fn create_ensemble(config: &DetectionConfig) -> Vec<Box<dyn CandidateGenerator>> {
    config
        .generators
        .iter()
        .map(|&method| create_generator(method, config))
        .collect()
}

/// Run every generator on the region, keeping ensemble order
#[must_use]
pub fn propose(generators: &[Box<dyn CandidateGenerator>], roi: &GrayImage) -> Vec<Candidate> {
    generators
        .iter()
        .filter_map(|generator| {
            let candidate = generator.generate(roi);
            if candidate.is_none() {
                log::trace!("{} produced no candidate", generator.name());
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_roundtrip() {
        for method in DetectionMethod::ALL {
            assert_eq!(method.name().parse::<DetectionMethod>().unwrap(), method);
        }
        assert_eq!("otsu".parse::<DetectionMethod>().unwrap(), DetectionMethod::GlobalThreshold);
        assert_eq!("Circle-Fit".parse::<DetectionMethod>().unwrap(), DetectionMethod::CircleFit);
        assert!("starburst".parse::<DetectionMethod>().is_err());
    }

    #[test]
    fn test_create_generator_by_name() {
        let config = DetectionConfig::default();
        let generator = create_generator_by_name("darkest", &config).unwrap();
        assert_eq!(generator.method(), DetectionMethod::DarkestRegion);
        assert_eq!(generator.name(), "darkest_region");
        assert!(create_generator_by_name("unknown", &config).is_err());
    }

    #[test]
    fn test_ensemble_follows_config_order() {
        let config = DetectionConfig {
            generators: vec![DetectionMethod::CircleFit, DetectionMethod::AdaptiveThreshold],
            ..DetectionConfig::default()
        };
        let ensemble = create_ensemble(&config);
        let methods: Vec<_> = ensemble.iter().map(|g| g.method()).collect();
        assert_eq!(methods, vec![DetectionMethod::CircleFit, DetectionMethod::AdaptiveThreshold]);
    }

    #[test]
    fn test_propose_on_blank_region() {
        let ensemble = create_ensemble(&DetectionConfig::default());
        let roi = GrayImage::from_pixel(40, 40, image::Luma([180]));
        assert!(propose(&ensemble, &roi).is_empty());
    }
}
