//! Pupil detection and tracking guided by facial landmarks.
//!
//! Given a video frame and the normalized landmarks of an external face
//! tracker, the engine estimates the center and diameter of each pupil:
//! 1. Region extraction around the iris landmarks of each eye
//! 2. An ensemble of independent candidate generators (thresholding,
//!    ray casting, gradient analysis, circle fitting)
//! 3. Score-based selection of one candidate per eye
//! 4. Per-eye temporal filtering with a stability score and short-miss
//!    coasting
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use pupil_tracking::{Config, EyeMode, LandmarkSet, PupilEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = PupilEngine::new(Config::default())?;
//!
//! let frame = image::open("frame.png")?.to_luma8();
//! let landmarks: LandmarkSet = serde_yaml::from_str("[[0.41, 0.38], [0.43, 0.37]]")?;
//!
//! for (eye, estimate) in engine.detect(&frame, &landmarks, EyeMode::Both) {
//!     println!(
//!         "{eye}: center ({:.1}, {:.1}) diameter {:.1}px via {}",
//!         estimate.center.0, estimate.center.1, estimate.smoothed_diameter, estimate.source_method
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Filters
//!
//! ```no_run
//! use pupil_tracking::filters::{create_filter, Measurement, PupilFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut filter = create_filter("kalman")?;
//!
//! let smoothed = filter.apply(Measurement::new(320.5, 240.2, 18.0));
//! println!("Filtered diameter: {:.2}px", smoothed.diameter);
//!
//! filter.reset();
//! # Ok(())
//! # }
//! ```
//!
//! ## Running Single Generators
//!
//! ```no_run
//! use pupil_tracking::detection::{create_generator_by_name, CandidateGenerator};
//! use pupil_tracking::config::DetectionConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let roi = image::open("eye.png")?.to_luma8();
//! let generator = create_generator_by_name("circle_fit", &DetectionConfig::default())?;
//! if let Some(candidate) = generator.generate(&roi) {
//!     println!("{}: diameter {:.1}", generator.name(), candidate.diameter);
//! }
//! # Ok(())
//! # }
//! ```

/// Read-only pixel access for frames
pub mod frame;

/// Normalized facial landmarks and eye selection
pub mod landmarks;

/// Landmark-guided eye region extraction
pub mod region;

/// Pupil candidate generators
pub mod detection;

/// Candidate scoring and selection
pub mod selector;

/// Temporal filters for smoothing pupil measurements
pub mod filters;

/// Frame-to-frame stability scoring
pub mod stability;

/// Per-eye tracking state machine
pub mod tracker;

/// Detection and tracking entry point
pub mod engine;

/// Utility functions for image statistics and coordinate conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use config::Config;
pub use detection::{Candidate, DetectionMethod};
pub use engine::PupilEngine;
pub use error::{Error, Result};
pub use frame::{Frame, RawFrame};
pub use landmarks::{Eye, EyeMode, Landmark, LandmarkSet};
pub use region::EyeRegion;
pub use tracker::{PupilEstimate, TrackingState};
