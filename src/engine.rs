//! Public entry point: per-frame pupil detection and tracking.

use crate::config::Config;
use crate::detection::{create_ensemble, propose, CandidateGenerator};
use crate::frame::Frame;
use crate::landmarks::{Eye, EyeMode, LandmarkSet};
use crate::region::RegionExtractor;
use crate::selector::CandidateSelector;
use crate::tracker::{EyeTracker, PupilEstimate, TrackingState};
use crate::utils::image_conversion::crop_gray;
use crate::Result;
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Landmark-guided pupil detector with per-eye temporal tracking
pub struct PupilEngine {
    config: Config,
    extractor: RegionExtractor,
    generators: Vec<Box<dyn CandidateGenerator>>,
    selector: CandidateSelector,
    trackers: BTreeMap<Eye, EyeTracker>,
}

impl PupilEngine {
    /// Build an engine from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names an unknown filter model
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut trackers = BTreeMap::new();
        for eye in [Eye::Left, Eye::Right] {
            trackers.insert(eye, EyeTracker::new(eye, config.create_filter()?, &config.tracking));
        }
        let generators = create_ensemble(&config.detection);
        info!(
            "Pupil engine ready: generators [{}], filter {}",
            generators.iter().map(|g| g.name()).collect::<Vec<_>>().join(", "),
            config.filter.model
        );

        Ok(Self {
            extractor: RegionExtractor::new(config.region.clone(), config.landmarks.clone()),
            selector: CandidateSelector::new(config.selector.clone()),
            generators,
            trackers,
            config,
        })
    }

    /// Process one frame for the eyes selected by `mode`.
    ///
    /// Eyes without a measurement are absent from the result unless they
    /// are coasting. Malformed input yields an empty map and leaves every
    /// tracker untouched.
    pub fn detect(&mut self, frame: &dyn Frame, landmarks: &LandmarkSet, mode: EyeMode) -> BTreeMap<Eye, PupilEstimate> {
        let mut estimates = BTreeMap::new();
        if !frame.is_valid() {
            warn!("Ignoring malformed frame ({}x{})", frame.width(), frame.height());
            return estimates;
        }
        if landmarks.is_empty() {
            warn!("Ignoring frame with an empty landmark set");
            return estimates;
        }

        for &eye in mode.eyes() {
            if let Some(estimate) = self.process_eye(frame, landmarks, eye) {
                estimates.insert(eye, estimate);
            }
        }
        estimates
    }

    fn process_eye(&mut self, frame: &dyn Frame, landmarks: &LandmarkSet, eye: Eye) -> Option<PupilEstimate> {
        let tracker = self.trackers.get_mut(&eye)?;

        let Some(region) = self.extractor.extract(landmarks, eye, frame.width(), frame.height()) else {
            debug!("{eye} eye: no usable region");
            return tracker.miss();
        };

        let roi = crop_gray(frame, &region);
        let candidates = propose(&self.generators, &roi);
        match self.selector.select(&candidates, &region) {
            Some(selection) => Some(tracker.observe(&selection, region)),
            None => {
                debug!("{eye} eye: no candidate from {} generators", self.generators.len());
                tracker.miss()
            }
        }
    }

    /// Return every eye to `Uninitialized`, discarding filter history
    pub fn reset(&mut self) {
        for tracker in self.trackers.values_mut() {
            tracker.reset();
        }
        info!("Pupil engine reset");
    }

    /// Current tracking state of one eye
    #[must_use]
    pub fn tracking_state(&self, eye: Eye) -> TrackingState {
        self.trackers.get(&eye).map_or(TrackingState::Uninitialized, EyeTracker::state)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
