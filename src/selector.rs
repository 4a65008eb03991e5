//! Fusion of generator candidates into one measurement per eye.

use crate::config::SelectorConfig;
use crate::detection::{Candidate, DetectionMethod};
use crate::region::EyeRegion;

/// The winning candidate, located in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Winner as proposed, region-relative
    pub candidate: Candidate,
    /// Horizontal center in frame pixels
    pub frame_x: f64,
    /// Vertical center in frame pixels
    pub frame_y: f64,
    /// Fusion score of the winner
    pub score: f64,
}

/// Scores candidates and picks the most plausible one
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    config: SelectorConfig,
}

impl CandidateSelector {
    #[must_use]
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// 1.0 inside the plausible diameter range, the configured penalty outside
    #[must_use]
    pub fn size_plausibility(&self, diameter: f64) -> f64 {
        if (self.config.plausible_min_diameter..=self.config.plausible_max_diameter).contains(&diameter) {
            1.0
        } else {
            self.config.implausible_size_score
        }
    }

    /// Prior preference for methods that tend to be more precise
    #[must_use]
    pub fn method_bonus(&self, method: DetectionMethod) -> f64 {
        match method {
            DetectionMethod::CircleFit => self.config.circle_fit_bonus,
            DetectionMethod::DarkestRegion => self.config.darkest_region_bonus,
            _ => 0.0,
        }
    }

    /// Weighted fusion score of one candidate
    #[must_use]
    pub fn score(&self, candidate: &Candidate) -> f64 {
        self.config.confidence_weight * candidate.confidence
            + self.config.circularity_weight * candidate.circularity
            + self.config.size_weight * self.size_plausibility(candidate.diameter)
            + self.method_bonus(candidate.method)
    }

    /// Pick the best candidate and translate it into frame coordinates.
    ///
    /// Candidates are compared in input order with a strict `>`, so the
    /// earliest of equally scored candidates wins. Non-finite scores never win.
    #[must_use]
    pub fn select(&self, candidates: &[Candidate], region: &EyeRegion) -> Option<Selection> {
        let mut best: Option<(Candidate, f64)> = None;
        for candidate in candidates {
            let score = self.score(candidate);
            if !score.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((*candidate, score));
            }
        }

        best.map(|(candidate, score)| {
            let (frame_x, frame_y) = region.to_frame(candidate.center_x, candidate.center_y);
            log::trace!("selected {} (score {score:.3})", candidate.method);
            Selection { candidate, frame_x, frame_y, score }
        })
    }
}
