//! Configuration management for the pupil tracking engine

use crate::constants::{
    DEFAULT_ADAPTIVE_OFFSET, DEFAULT_BLOCK_RADIUS, DEFAULT_BLUR_SIGMA, DEFAULT_BRIGHTNESS_DELTA,
    DEFAULT_CENTER_STABILITY_SCALE, DEFAULT_COAST_STABILITY_DECAY, DEFAULT_CONTRAST_SCALE,
    DEFAULT_DARK_PERCENTILE, DEFAULT_DIAMETER_Q, DEFAULT_DIAMETER_R, DEFAULT_GRADIENT_THRESHOLD,
    DEFAULT_INITIAL_UNCERTAINTY, DEFAULT_LOST_AFTER_FRAMES, DEFAULT_MAX_AREA, DEFAULT_MAX_DIAMETER,
    DEFAULT_MAX_FIT_RESIDUAL, DEFAULT_MIN_ABSOLUTE_THRESHOLD, DEFAULT_MIN_AREA, DEFAULT_MIN_CIRCULARITY,
    DEFAULT_MIN_DIAMETER, DEFAULT_MIN_REGION_SIZE, DEFAULT_POSITION_Q, DEFAULT_POSITION_R,
    DEFAULT_RADIUS_PERCENTILE, DEFAULT_RAY_COUNT, DEFAULT_REGION_PADDING, DEFAULT_REGION_SCALE,
    DEFAULT_SIZE_STABILITY_SCALE, LEFT_IRIS_INDICES, RIGHT_IRIS_INDICES,
};
use crate::detection::DetectionMethod;
use crate::landmarks::Eye;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Landmark index mapping
    pub landmarks: LandmarkConfig,

    /// Eye region extraction
    pub region: RegionConfig,

    /// Candidate generator ensemble
    pub detection: DetectionConfig,

    /// Candidate scoring
    pub selector: SelectorConfig,

    /// Temporal filter tuning
    pub filter: FilterConfig,

    /// Tracking state machine and stability scoring
    pub tracking: TrackingConfig,
}

/// Which landmark indices outline each iris
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Indices of the subject's left iris points
    pub left_iris: Vec<usize>,

    /// Indices of the subject's right iris points
    pub right_iris: Vec<usize>,
}

/// Region extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Region side as a multiple of the iris radius
    pub scale: f64,

    /// Extra padding on every side (pixels)
    pub padding: f64,

    /// Regions with width or height at or below this are skipped (pixels)
    pub min_size: u32,
}

/// Candidate generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Generators to run, in order
    pub generators: Vec<DetectionMethod>,

    /// Gaussian pre-blur sigma
    pub blur_sigma: f32,

    /// Smallest accepted pupil diameter (pixels)
    pub min_diameter: f64,

    /// Largest accepted pupil diameter (pixels)
    pub max_diameter: f64,

    /// Connected-component scoring shared by the threshold generators
    pub components: ComponentConfig,

    /// Adaptive local threshold
    pub adaptive: AdaptiveConfig,

    /// Darkest-region expansion
    pub darkest: DarkestRegionConfig,

    /// Contrast-relative threshold
    pub contrast: ContrastConfig,

    /// Gradient-weighted centroid
    pub gradient: GradientConfig,

    /// Radial voting and circle fit
    pub circle_fit: CircleFitConfig,
}

/// Connected-component acceptance and confidence weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Minimum component area (pixels)
    pub min_area: usize,

    /// Maximum component area (pixels)
    pub max_area: usize,

    /// Minimum circularity (0.0-1.0)
    pub min_circularity: f64,

    /// Confidence weight of circularity
    pub circularity_weight: f64,

    /// Confidence weight of proximity to the region center
    pub centrality_weight: f64,
}

/// Adaptive local threshold parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Minimum radius of the local-mean window (pixels)
    pub block_radius: u32,

    /// Window radius as a fraction of the shorter region side, when larger
    pub block_fraction: f64,

    /// Pixels must be this much darker than their local mean
    pub offset: u8,

    /// Only the darkest fraction of the region may be flagged
    pub dark_percentile: f64,
}

/// Darkest-region expansion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarkestRegionConfig {
    /// Number of radial sampling directions
    pub ray_count: usize,

    /// Rays stop once intensity exceeds the seed by this much
    pub brightness_delta: f64,

    /// Intensity tolerance of the dark plateau around the minimum
    pub core_tolerance: u8,
}

/// Contrast-relative threshold parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    /// Lower bound of the threshold
    pub min_absolute_threshold: f64,

    /// Threshold as a fraction of the region mean
    pub scale: f64,
}

/// Gradient-weighted centroid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Edge threshold as a fraction of the strongest gradient
    pub threshold: f64,

    /// Percentile of edge distances used as the radius
    pub radius_percentile: f64,
}

/// Radial voting and circle fit parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleFitConfig {
    /// Edge threshold as a fraction of the strongest gradient
    pub edge_threshold: f64,

    /// Largest mean residual accepted (pixels)
    pub max_residual: f64,

    /// Minimum number of inlier edge points
    pub min_inliers: usize,
}

/// Candidate scoring weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Weight of candidate confidence
    pub confidence_weight: f64,

    /// Weight of candidate circularity
    pub circularity_weight: f64,

    /// Weight of size plausibility
    pub size_weight: f64,

    /// Lower edge of the plausible diameter band (pixels)
    pub plausible_min_diameter: f64,

    /// Upper edge of the plausible diameter band (pixels)
    pub plausible_max_diameter: f64,

    /// Size plausibility outside the band
    pub implausible_size_score: f64,

    /// Bonus for circle-fit candidates
    pub circle_fit_bonus: f64,

    /// Bonus for darkest-region candidates
    pub darkest_region_bonus: f64,
}

/// Temporal filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter model: "kalman", "constant_velocity" or "none"
    pub model: String,

    /// Process noise of the position channels
    pub position_q: f64,

    /// Measurement noise of the position channels
    pub position_r: f64,

    /// Process noise of the diameter channel
    pub diameter_q: f64,

    /// Measurement noise of the diameter channel
    pub diameter_r: f64,

    /// Error covariance assigned on the first measurement
    pub initial_uncertainty: f64,
}

/// Tracking state machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Consecutive misses before an eye is reported lost
    pub lost_after_frames: u32,

    /// Stability multiplier applied per missed frame while coasting
    pub coast_stability_decay: f64,

    /// Center change that drives positional stability to zero (pixels)
    pub center_stability_scale: f64,

    /// Diameter change that drives size stability to zero (pixels)
    pub size_stability_scale: f64,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            left_iris: LEFT_IRIS_INDICES.to_vec(),
            right_iris: RIGHT_IRIS_INDICES.to_vec(),
        }
    }
}

impl LandmarkConfig {
    /// Iris indices for one eye
    #[must_use]
    pub fn indices(&self, eye: Eye) -> &[usize] {
        match eye {
            Eye::Left => &self.left_iris,
            Eye::Right => &self.right_iris,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_REGION_SCALE,
            padding: DEFAULT_REGION_PADDING,
            min_size: DEFAULT_MIN_REGION_SIZE,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            generators: DetectionMethod::ALL.to_vec(),
            blur_sigma: DEFAULT_BLUR_SIGMA,
            min_diameter: DEFAULT_MIN_DIAMETER,
            max_diameter: DEFAULT_MAX_DIAMETER,
            components: ComponentConfig::default(),
            adaptive: AdaptiveConfig::default(),
            darkest: DarkestRegionConfig::default(),
            contrast: ContrastConfig::default(),
            gradient: GradientConfig::default(),
            circle_fit: CircleFitConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Whether a diameter lies in the accepted absolute range
    #[must_use]
    pub fn diameter_in_range(&self, diameter: f64) -> bool {
        diameter.is_finite() && diameter >= self.min_diameter && diameter <= self.max_diameter
    }
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
            min_circularity: DEFAULT_MIN_CIRCULARITY,
            circularity_weight: 0.6,
            centrality_weight: 0.4,
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            block_radius: DEFAULT_BLOCK_RADIUS,
            block_fraction: 0.5,
            offset: DEFAULT_ADAPTIVE_OFFSET,
            dark_percentile: DEFAULT_DARK_PERCENTILE,
        }
    }
}

impl Default for DarkestRegionConfig {
    fn default() -> Self {
        Self {
            ray_count: DEFAULT_RAY_COUNT,
            brightness_delta: DEFAULT_BRIGHTNESS_DELTA,
            core_tolerance: 10,
        }
    }
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            min_absolute_threshold: DEFAULT_MIN_ABSOLUTE_THRESHOLD,
            scale: DEFAULT_CONTRAST_SCALE,
        }
    }
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GRADIENT_THRESHOLD,
            radius_percentile: DEFAULT_RADIUS_PERCENTILE,
        }
    }
}

impl Default for CircleFitConfig {
    fn default() -> Self {
        Self {
            edge_threshold: DEFAULT_GRADIENT_THRESHOLD,
            max_residual: DEFAULT_MAX_FIT_RESIDUAL,
            min_inliers: 12,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            confidence_weight: 0.4,
            circularity_weight: 0.3,
            size_weight: 0.2,
            plausible_min_diameter: 8.0,
            plausible_max_diameter: 40.0,
            implausible_size_score: 0.5,
            circle_fit_bonus: 0.1,
            darkest_region_bonus: 0.05,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            model: "kalman".to_string(),
            position_q: DEFAULT_POSITION_Q,
            position_r: DEFAULT_POSITION_R,
            diameter_q: DEFAULT_DIAMETER_Q,
            diameter_r: DEFAULT_DIAMETER_R,
            initial_uncertainty: DEFAULT_INITIAL_UNCERTAINTY,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            lost_after_frames: DEFAULT_LOST_AFTER_FRAMES,
            coast_stability_decay: DEFAULT_COAST_STABILITY_DECAY,
            center_stability_scale: DEFAULT_CENTER_STABILITY_SCALE,
            size_stability_scale: DEFAULT_SIZE_STABILITY_SCALE,
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be between 0.0 and 1.0")))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be positive")))
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the temporal filter described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown model name
    pub fn create_filter(&self) -> Result<Box<dyn crate::filters::PupilFilter>> {
        crate::filters::create_filter_with(&self.filter)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        // Landmarks
        if self.landmarks.left_iris.is_empty() || self.landmarks.right_iris.is_empty() {
            return Err(Error::ConfigError(
                "Each eye needs at least one iris landmark index".to_string(),
            ));
        }

        // Region
        check_positive("Region scale", self.region.scale)?;
        if !self.region.padding.is_finite() || self.region.padding < 0.0 {
            return Err(Error::ConfigError("Region padding must be non-negative".to_string()));
        }

        // Detection
        let detection = &self.detection;
        if detection.generators.is_empty() {
            return Err(Error::ConfigError("At least one generator must be enabled".to_string()));
        }
        if !detection.blur_sigma.is_finite() || detection.blur_sigma < 0.0 {
            return Err(Error::ConfigError("Blur sigma must be non-negative".to_string()));
        }
        check_positive("Minimum diameter", detection.min_diameter)?;
        if detection.max_diameter <= detection.min_diameter {
            return Err(Error::ConfigError(
                "Maximum diameter must exceed minimum diameter".to_string(),
            ));
        }
        if detection.components.min_area == 0 || detection.components.max_area < detection.components.min_area {
            return Err(Error::ConfigError(
                "Component area range must be non-empty and start above 0".to_string(),
            ));
        }
        check_unit("Minimum circularity", detection.components.min_circularity)?;
        check_unit("Dark percentile", detection.adaptive.dark_percentile)?;
        check_unit("Block fraction", detection.adaptive.block_fraction)?;
        if detection.darkest.ray_count < 4 {
            return Err(Error::ConfigError("Ray count must be at least 4".to_string()));
        }
        check_positive("Brightness delta", detection.darkest.brightness_delta)?;
        check_positive("Contrast scale", detection.contrast.scale)?;
        check_unit("Gradient threshold", detection.gradient.threshold)?;
        check_unit("Radius percentile", detection.gradient.radius_percentile)?;
        check_unit("Circle fit edge threshold", detection.circle_fit.edge_threshold)?;
        check_positive("Circle fit residual", detection.circle_fit.max_residual)?;
        if detection.circle_fit.min_inliers < 3 {
            return Err(Error::ConfigError("Circle fit needs at least 3 inliers".to_string()));
        }

        // Selector
        if self.selector.plausible_max_diameter < self.selector.plausible_min_diameter {
            return Err(Error::ConfigError("Plausible diameter band is inverted".to_string()));
        }

        // Filter
        check_positive("Position Q", self.filter.position_q)?;
        check_positive("Position R", self.filter.position_r)?;
        check_positive("Diameter Q", self.filter.diameter_q)?;
        check_positive("Diameter R", self.filter.diameter_r)?;
        check_positive("Initial uncertainty", self.filter.initial_uncertainty)?;

        // Tracking
        if self.tracking.lost_after_frames == 0 {
            return Err(Error::ConfigError(
                "Lost timeout must be at least one frame".to_string(),
            ));
        }
        check_unit("Coast stability decay", self.tracking.coast_stability_decay)?;
        check_positive("Center stability scale", self.tracking.center_stability_scale)?;
        check_positive("Size stability scale", self.tracking.size_stability_scale)?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Pupil Tracking Configuration

# MediaPipe refined-mesh iris points
landmarks:
  left_iris: [473, 474, 475, 476, 477]
  right_iris: [468, 469, 470, 471, 472]

# Eye region extraction
region:
  scale: 2.5
  padding: 5.0
  min_size: 10

# Candidate generators
detection:
  generators: [adaptive_threshold, global_threshold, darkest_region, contrast_threshold, gradient_centroid, circle_fit]
  blur_sigma: 1.0
  min_diameter: 4.0
  max_diameter: 80.0
  components:
    min_area: 15
    max_area: 4000
    min_circularity: 0.4
    circularity_weight: 0.6
    centrality_weight: 0.4
  adaptive:
    block_radius: 7
    block_fraction: 0.5
    offset: 5
    dark_percentile: 0.2
  darkest:
    ray_count: 16
    brightness_delta: 25.0
    core_tolerance: 10
  contrast:
    min_absolute_threshold: 30.0
    scale: 0.7
  gradient:
    threshold: 0.3
    radius_percentile: 0.9
  circle_fit:
    edge_threshold: 0.3
    max_residual: 1.5
    min_inliers: 12

# Candidate scoring
selector:
  confidence_weight: 0.4
  circularity_weight: 0.3
  size_weight: 0.2
  plausible_min_diameter: 8.0
  plausible_max_diameter: 40.0
  implausible_size_score: 0.5
  circle_fit_bonus: 0.1
  darkest_region_bonus: 0.05

# Temporal filter
filter:
  model: "kalman"
  position_q: 0.1
  position_r: 2.0
  diameter_q: 0.2
  diameter_r: 2.0
  initial_uncertainty: 1.0

# Tracking
tracking:
  lost_after_frames: 5
  coast_stability_decay: 0.5
  center_stability_scale: 10.0
  size_stability_scale: 5.0
"#;
