//! Temporal filtering of per-frame pupil measurements.
//!
//! Raw measurements jump by a pixel or two between frames even on a steady
//! gaze. A filter owned by each eye smooths center and diameter across frames.

/// Independent scalar Kalman channels for x, y and diameter
pub mod kalman;

/// Joint constant-velocity Kalman over position, diameter and their rates
pub mod constant_velocity;

use crate::config::FilterConfig;
use crate::Result;

/// One raw or smoothed pupil observation, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
}

impl Measurement {
    #[must_use]
    pub fn new(x: f64, y: f64, diameter: f64) -> Self {
        Self { x, y, diameter }
    }
}

/// Trait for all pupil filters
pub trait PupilFilter: Send + Sync {
    /// Fold a measurement into the filter and return the smoothed value
    fn apply(&mut self, measurement: Measurement) -> Measurement;

    /// Forget all history
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;

    /// Whether at least one measurement has been applied since the last reset
    fn is_initialized(&self) -> bool;
}

/// Pass-through filter
#[derive(Debug, Default)]
pub struct NoFilter {
    initialized: bool,
}

impl PupilFilter for NoFilter {
    fn apply(&mut self, measurement: Measurement) -> Measurement {
        self.initialized = true;
        measurement
    }

    fn reset(&mut self) {
        self.initialized = false;
    }

    fn name(&self) -> &str {
        "NoFilter"
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Create a filter by type name with default tuning
///
/// # Errors
///
/// Returns `Error::FilterError` for an unknown name
pub fn create_filter(filter_type: &str) -> Result<Box<dyn PupilFilter>> {
    create_filter_with(&FilterConfig { model: filter_type.to_string(), ..FilterConfig::default() })
}

/// Create the filter described by the configuration
///
/// # Errors
///
/// Returns `Error::FilterError` for an unknown model name
pub fn create_filter_with(config: &FilterConfig) -> Result<Box<dyn PupilFilter>> {
    match config.model.to_lowercase().as_str() {
        "none" | "nofilter" => Ok(Box::new(NoFilter::default())),
        "kalman" => Ok(Box::new(kalman::KalmanFilter::from_config(config))),
        "constant_velocity" | "constantvelocity" | "cv" => {
            Ok(Box::new(constant_velocity::ConstantVelocityKalman::from_config(config)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {}", config.model))),
    }
}
