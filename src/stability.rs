//! Frame-to-frame consistency score.

use crate::config::TrackingConfig;
use crate::constants::NEUTRAL_STABILITY;
use crate::filters::Measurement;
use crate::utils::distance;

/// Compares each raw measurement against the previous one
#[derive(Debug, Clone)]
pub struct StabilityEstimator {
    center_scale: f64,
    size_scale: f64,
    previous: Option<Measurement>,
}

impl StabilityEstimator {
    #[must_use]
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            center_scale: config.center_stability_scale,
            size_scale: config.size_stability_scale,
            previous: None,
        }
    }

    /// Score `raw` against the previous raw measurement and remember it.
    ///
    /// `mean(max(0, 1 - Δcenter/K1), max(0, 1 - Δsize/K2))`; the first
    /// measurement after construction or reset scores 0.5.
    pub fn update(&mut self, raw: Measurement) -> f64 {
        let score = self.previous.map_or(NEUTRAL_STABILITY, |previous| {
            let center_delta = distance((raw.x, raw.y), (previous.x, previous.y));
            let size_delta = (raw.diameter - previous.diameter).abs();
            let center = (1.0 - center_delta / self.center_scale).max(0.0);
            let size = (1.0 - size_delta / self.size_scale).max(0.0);
            (center + size) / 2.0
        });
        self.previous = Some(raw);
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
