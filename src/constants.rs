//! Constants used throughout the library

/// Iris landmark indices for the subject's left eye (MediaPipe refined mesh)
pub const LEFT_IRIS_INDICES: [usize; 5] = [473, 474, 475, 476, 477];

/// Iris landmark indices for the subject's right eye (MediaPipe refined mesh)
pub const RIGHT_IRIS_INDICES: [usize; 5] = [468, 469, 470, 471, 472];

/// Region side as a multiple of the iris radius
pub const DEFAULT_REGION_SCALE: f64 = 2.5;
/// Fixed padding added on every side of the region (pixels)
pub const DEFAULT_REGION_PADDING: f64 = 5.0;
/// Regions at or below this width/height are skipped
pub const DEFAULT_MIN_REGION_SIZE: u32 = 10;

/// Absolute pupil diameter bounds applied by every generator (pixels)
pub const DEFAULT_MIN_DIAMETER: f64 = 4.0;
pub const DEFAULT_MAX_DIAMETER: f64 = 80.0;

/// Connected component area bounds (pixels)
pub const DEFAULT_MIN_AREA: usize = 15;
pub const DEFAULT_MAX_AREA: usize = 4000;
pub const DEFAULT_MIN_CIRCULARITY: f64 = 0.4;

/// Light pre-blur applied before thresholding
pub const DEFAULT_BLUR_SIGMA: f32 = 1.0;

/// Adaptive threshold defaults
pub const DEFAULT_BLOCK_RADIUS: u32 = 7;
pub const DEFAULT_ADAPTIVE_OFFSET: u8 = 5;
pub const DEFAULT_DARK_PERCENTILE: f64 = 0.2;

/// Darkest-region expansion defaults
pub const DEFAULT_RAY_COUNT: usize = 16;
pub const DEFAULT_BRIGHTNESS_DELTA: f64 = 25.0;

/// Contrast-relative threshold defaults
pub const DEFAULT_MIN_ABSOLUTE_THRESHOLD: f64 = 30.0;
pub const DEFAULT_CONTRAST_SCALE: f64 = 0.7;

/// Gradient centroid defaults
pub const DEFAULT_GRADIENT_THRESHOLD: f64 = 0.3;
pub const DEFAULT_RADIUS_PERCENTILE: f64 = 0.9;

/// Circle fit defaults
pub const DEFAULT_MAX_FIT_RESIDUAL: f64 = 1.5;

/// Confidence scaling relative to the adaptive method
pub const GLOBAL_THRESHOLD_CONFIDENCE_SCALE: f64 = 0.9;
pub const CONTRAST_THRESHOLD_CONFIDENCE_SCALE: f64 = 0.85;

/// Per-channel Kalman tuning
pub const DEFAULT_POSITION_Q: f64 = 0.1;
pub const DEFAULT_POSITION_R: f64 = 2.0;
pub const DEFAULT_DIAMETER_Q: f64 = 0.2;
pub const DEFAULT_DIAMETER_R: f64 = 2.0;
pub const DEFAULT_INITIAL_UNCERTAINTY: f64 = 1.0;

/// Stability normalisation constants (pixels)
pub const DEFAULT_CENTER_STABILITY_SCALE: f64 = 10.0;
pub const DEFAULT_SIZE_STABILITY_SCALE: f64 = 5.0;
/// Stability reported for the first measurement of an eye
pub const NEUTRAL_STABILITY: f64 = 0.5;

/// Consecutive misses before an eye is dropped from output
pub const DEFAULT_LOST_AFTER_FRAMES: u32 = 5;
/// Per-miss stability multiplier while coasting
pub const DEFAULT_COAST_STABILITY_DECAY: f64 = 0.5;
