use super::{Measurement, PupilFilter};
use crate::config::FilterConfig;

/// One-dimensional random-walk Kalman filter
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanChannel {
    estimate: f64,
    error_covariance: f64,
    q: f64,
    r: f64,
    initial_uncertainty: f64,
    initialized: bool,
}

impl KalmanChannel {
    /// # Panics
    ///
    /// Panics if `q` is negative, `r` is not positive or `initial_uncertainty` is negative
    #[must_use]
    pub fn new(q: f64, r: f64, initial_uncertainty: f64) -> Self {
        assert!(q >= 0.0, "Process noise must be non-negative");
        assert!(r > 0.0, "Measurement noise must be positive");
        assert!(initial_uncertainty >= 0.0, "Initial uncertainty must be non-negative");
        Self {
            estimate: 0.0,
            error_covariance: initial_uncertainty,
            q,
            r,
            initial_uncertainty,
            initialized: false,
        }
    }

    /// Fold in one measurement and return the new estimate
    pub fn update(&mut self, measurement: f64) -> f64 {
        if !self.initialized {
            self.estimate = measurement;
            self.error_covariance = self.initial_uncertainty;
            self.initialized = true;
            return self.estimate;
        }

        self.error_covariance += self.q;
        let gain = self.error_covariance / (self.error_covariance + self.r);
        self.estimate += gain * (measurement - self.estimate);
        self.error_covariance *= 1.0 - gain;
        self.estimate
    }

    pub fn reset(&mut self) {
        self.estimate = 0.0;
        self.error_covariance = self.initial_uncertainty;
        self.initialized = false;
    }

    #[must_use]
    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    #[must_use]
    pub fn error_covariance(&self) -> f64 {
        self.error_covariance
    }

    #[must_use]
    pub fn q(&self) -> f64 {
        self.q
    }

    #[must_use]
    pub fn r(&self) -> f64 {
        self.r
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Three independent channels: x, y and diameter
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanFilter {
    x: KalmanChannel,
    y: KalmanChannel,
    diameter: KalmanChannel,
}

impl KalmanFilter {
    /// # Panics
    ///
    /// Panics on invalid noise parameters, see [`KalmanChannel::new`]
    #[must_use]
    pub fn new(position_q: f64, position_r: f64, diameter_q: f64, diameter_r: f64) -> Self {
        Self::from_config(&FilterConfig { position_q, position_r, diameter_q, diameter_r, ..FilterConfig::default() })
    }

    /// # Panics
    ///
    /// Panics on invalid noise parameters; `Config::validate` rejects them first
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        let position = KalmanChannel::new(config.position_q, config.position_r, config.initial_uncertainty);
        Self {
            x: position.clone(),
            y: position,
            diameter: KalmanChannel::new(config.diameter_q, config.diameter_r, config.initial_uncertainty),
        }
    }

    #[must_use]
    pub fn channels(&self) -> [&KalmanChannel; 3] {
        [&self.x, &self.y, &self.diameter]
    }
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl PupilFilter for KalmanFilter {
    fn apply(&mut self, measurement: Measurement) -> Measurement {
        Measurement {
            x: self.x.update(measurement.x),
            y: self.y.update(measurement.y),
            diameter: self.diameter.update(measurement.diameter),
        }
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.diameter.reset();
    }

    fn name(&self) -> &str {
        "KalmanFilter"
    }

    fn is_initialized(&self) -> bool {
        self.x.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_measurement_initializes() {
        let mut channel = KalmanChannel::new(0.1, 2.0, 1.0);
        assert!(!channel.is_initialized());
        assert_eq!(channel.update(42.0), 42.0);
        assert_eq!(channel.error_covariance(), 1.0);
        assert!(channel.is_initialized());
    }

    #[test]
    fn test_update_equations() {
        let mut channel = KalmanChannel::new(0.1, 2.0, 1.0);
        channel.update(10.0);
        let out = channel.update(20.0);

        // P = 1.1, K = 1.1 / 3.1
        let gain = 1.1 / 3.1;
        assert!((out - (10.0 + gain * 10.0)).abs() < 1e-12);
        assert!((channel.error_covariance() - 1.1 * (1.0 - gain)).abs() < 1e-12);
    }

    #[test]
    fn test_kalman_filter_smooths() {
        let mut filter = KalmanFilter::default();

        let first = filter.apply(Measurement::new(10.0, 20.0, 8.0));
        assert_eq!(first, Measurement::new(10.0, 20.0, 8.0));

        let second = filter.apply(Measurement::new(11.0, 21.0, 9.0));
        assert!(second.x > 10.0 && second.x < 11.0);
        assert!(second.y > 20.0 && second.y < 21.0);
        assert!(second.diameter > 8.0 && second.diameter < 9.0);
        // Diameter channel has more process noise, so it follows faster
        assert!(second.diameter - 8.0 > second.x - 10.0);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut filter = KalmanFilter::default();
        filter.apply(Measurement::new(10.0, 10.0, 10.0));
        filter.apply(Measurement::new(12.0, 12.0, 12.0));
        filter.reset();

        assert!(!filter.is_initialized());
        let out = filter.apply(Measurement::new(50.0, 60.0, 7.0));
        assert_eq!(out, Measurement::new(50.0, 60.0, 7.0));
    }

    #[test]
    #[should_panic(expected = "Measurement noise must be positive")]
    fn test_zero_measurement_noise_panics() {
        let _ = KalmanChannel::new(0.1, 0.0, 1.0);
    }
}
