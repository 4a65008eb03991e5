//! Per-eye tracking state: filter, stability and miss retention.

use crate::config::TrackingConfig;
use crate::detection::DetectionMethod;
use crate::filters::{Measurement, PupilFilter};
use crate::landmarks::Eye;
use crate::region::EyeRegion;
use crate::selector::Selection;
use crate::stability::StabilityEstimator;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracking lifecycle of one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    /// No measurement since construction or reset
    #[default]
    Uninitialized,
    /// The latest frame produced a measurement
    Tracking,
    /// Short miss run; the last estimate is re-emitted
    Coasting,
    /// Too many consecutive misses; nothing is emitted until reacquired
    Lost,
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Tracking => "tracking",
            Self::Coasting => "coasting",
            Self::Lost => "lost",
        };
        f.write_str(label)
    }
}

/// Smoothed pupil estimate for one eye and one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PupilEstimate {
    /// Filtered center in frame pixels
    pub center: (f64, f64),
    /// Filtered diameter (pixels)
    pub smoothed_diameter: f64,
    /// Diameter of the selected candidate before filtering
    pub raw_diameter: f64,
    pub confidence: f64,
    pub circularity: f64,
    /// Frame-to-frame consistency in [0, 1]
    pub stability: f64,
    /// Generator whose candidate was selected
    pub source_method: DetectionMethod,
    /// Region the candidate was found in
    pub region: EyeRegion,
    /// `Tracking` for a fresh measurement, `Coasting` for a re-emitted one
    pub state: TrackingState,
}

/// Owns everything that persists across frames for one eye
pub struct EyeTracker {
    eye: Eye,
    filter: Box<dyn PupilFilter>,
    stability: StabilityEstimator,
    state: TrackingState,
    missed_frames: u32,
    last: Option<PupilEstimate>,
    lost_after_frames: u32,
    coast_stability_decay: f64,
}

impl EyeTracker {
    #[must_use]
    pub fn new(eye: Eye, filter: Box<dyn PupilFilter>, config: &TrackingConfig) -> Self {
        Self {
            eye,
            filter,
            stability: StabilityEstimator::new(config),
            state: TrackingState::Uninitialized,
            missed_frames: 0,
            last: None,
            lost_after_frames: config.lost_after_frames.max(1),
            coast_stability_decay: config.coast_stability_decay,
        }
    }

    #[must_use]
    pub fn eye(&self) -> Eye {
        self.eye
    }

    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Consecutive frames without a measurement
    #[must_use]
    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    #[must_use]
    pub fn filter(&self) -> &dyn PupilFilter {
        self.filter.as_ref()
    }

    /// Fold a selected candidate into the filter and emit a fresh estimate
    pub fn observe(&mut self, selection: &Selection, region: EyeRegion) -> PupilEstimate {
        let candidate = &selection.candidate;
        let raw = Measurement::new(selection.frame_x, selection.frame_y, candidate.diameter);
        let stability = self.stability.update(raw);
        let smoothed = self.filter.apply(raw);

        self.transition(TrackingState::Tracking);
        self.missed_frames = 0;

        let estimate = PupilEstimate {
            center: (smoothed.x, smoothed.y),
            smoothed_diameter: smoothed.diameter,
            raw_diameter: candidate.diameter,
            confidence: candidate.confidence,
            circularity: candidate.circularity,
            stability,
            source_method: candidate.method,
            region,
            state: TrackingState::Tracking,
        };
        self.last = Some(estimate);
        estimate
    }

    /// Record a frame without a measurement.
    ///
    /// Within the retention window the last estimate comes back flagged
    /// `Coasting`, with stability decayed once per missed frame. The filter
    /// itself is left untouched.
    pub fn miss(&mut self) -> Option<PupilEstimate> {
        match self.state {
            TrackingState::Uninitialized | TrackingState::Lost => None,
            TrackingState::Tracking | TrackingState::Coasting => {
                self.missed_frames = self.missed_frames.saturating_add(1);
                if self.missed_frames >= self.lost_after_frames {
                    self.transition(TrackingState::Lost);
                    return None;
                }
                self.transition(TrackingState::Coasting);

                let exponent = i32::try_from(self.missed_frames).unwrap_or(i32::MAX);
                let decay = self.coast_stability_decay.powi(exponent);
                self.last.map(|last| PupilEstimate {
                    stability: last.stability * decay,
                    state: TrackingState::Coasting,
                    ..last
                })
            }
        }
    }

    /// Forget all history and return to `Uninitialized`
    pub fn reset(&mut self) {
        self.filter.reset();
        self.stability.reset();
        self.last = None;
        self.missed_frames = 0;
        self.transition(TrackingState::Uninitialized);
    }

    fn transition(&mut self, next: TrackingState) {
        if self.state != next {
            debug!("{} eye: {} -> {}", self.eye, self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Candidate;
    use crate::filters::kalman::KalmanFilter;

    fn selection(x: f64, y: f64, diameter: f64) -> Selection {
        Selection {
            candidate: Candidate {
                center_x: x,
                center_y: y,
                diameter,
                confidence: 0.9,
                circularity: 0.95,
                method: DetectionMethod::AdaptiveThreshold,
            },
            frame_x: x,
            frame_y: y,
            score: 1.0,
        }
    }

    fn tracker() -> EyeTracker {
        EyeTracker::new(Eye::Left, Box::new(KalmanFilter::default()), &TrackingConfig::default())
    }

    #[test]
    fn test_miss_before_first_measurement_emits_nothing() {
        let mut tracker = tracker();
        assert!(tracker.miss().is_none());
        assert_eq!(tracker.state(), TrackingState::Uninitialized);
    }

    #[test]
    fn test_coasting_then_lost() {
        let mut tracker = tracker();
        let region = EyeRegion::new(0, 0, 40, 40);
        tracker.observe(&selection(20.0, 20.0, 12.0), region);
        let stable = tracker.observe(&selection(20.0, 20.0, 12.0), region);
        assert_eq!(stable.stability, 1.0);

        for missed in 1..5 {
            let coasting = tracker.miss().unwrap();
            assert_eq!(coasting.state, TrackingState::Coasting);
            assert_eq!(coasting.center, stable.center);
            assert!((coasting.stability - 0.5f64.powi(missed)).abs() < 1e-12);
        }
        assert!(tracker.miss().is_none());
        assert_eq!(tracker.state(), TrackingState::Lost);
        assert!(tracker.miss().is_none());
    }

    #[test]
    fn test_reacquire_resumes_filter() {
        let mut tracker = tracker();
        let region = EyeRegion::new(0, 0, 40, 40);
        tracker.observe(&selection(20.0, 20.0, 12.0), region);
        for _ in 0..6 {
            tracker.miss();
        }
        assert_eq!(tracker.state(), TrackingState::Lost);

        let resumed = tracker.observe(&selection(24.0, 20.0, 12.0), region);
        assert_eq!(tracker.state(), TrackingState::Tracking);
        assert!(resumed.center.0 > 20.0 && resumed.center.0 < 24.0, "smoothing continues from prior state");
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut tracker = tracker();
        tracker.observe(&selection(20.0, 20.0, 12.0), EyeRegion::new(0, 0, 40, 40));
        tracker.reset();
        assert_eq!(tracker.state(), TrackingState::Uninitialized);
        assert!(!tracker.filter().is_initialized());
        assert!(tracker.miss().is_none());
    }
}
