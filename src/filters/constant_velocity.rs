use nalgebra::{Matrix3, Matrix3x6, Matrix6, Vector3, Vector6};
use super::{Measurement, PupilFilter};
use crate::config::FilterConfig;

/// Kalman filter over `[x, y, d, vx, vy, vd]` with a one-frame time step
pub struct ConstantVelocityKalman {
    state: Vector6<f64>,
    covariance: Matrix6<f64>,
    process_noise: Matrix6<f64>,
    measurement_noise: Matrix3<f64>,
    transition: Matrix6<f64>,
    measurement: Matrix3x6<f64>,
    initial_uncertainty: f64,
    initialized: bool,
}

/// Discrete white-noise acceleration blocks for dt = 1: `[q/4, q/2; q/2, q]`
fn white_noise_block(noise: &mut Matrix6<f64>, axis: usize, q: f64) {
    let rate = axis + 3;
    noise[(axis, axis)] = q / 4.0;
    noise[(axis, rate)] = q / 2.0;
    noise[(rate, axis)] = q / 2.0;
    noise[(rate, rate)] = q;
}

impl ConstantVelocityKalman {
    /// # Panics
    ///
    /// Panics if a measurement noise is not positive or a process noise is negative
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Self {
        assert!(config.position_r > 0.0 && config.diameter_r > 0.0, "Measurement noise must be positive");
        assert!(config.position_q >= 0.0 && config.diameter_q >= 0.0, "Process noise must be non-negative");

        let mut transition = Matrix6::identity();
        for axis in 0..3 {
            transition[(axis, axis + 3)] = 1.0;
        }

        let mut measurement = Matrix3x6::zeros();
        for axis in 0..3 {
            measurement[(axis, axis)] = 1.0;
        }

        let mut process_noise = Matrix6::zeros();
        white_noise_block(&mut process_noise, 0, config.position_q);
        white_noise_block(&mut process_noise, 1, config.position_q);
        white_noise_block(&mut process_noise, 2, config.diameter_q);

        let measurement_noise = Matrix3::from_diagonal(&Vector3::new(
            config.position_r,
            config.position_r,
            config.diameter_r,
        ));

        Self {
            state: Vector6::zeros(),
            covariance: Matrix6::identity() * config.initial_uncertainty,
            process_noise,
            measurement_noise,
            transition,
            measurement,
            initial_uncertainty: config.initial_uncertainty,
            initialized: false,
        }
    }

    /// Current `[vx, vy, vd]` rate estimate in pixels per frame
    #[must_use]
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.state[3], self.state[4], self.state[5])
    }

    fn predict(&mut self) {
        self.state = self.transition * self.state;
        self.covariance = self.transition * self.covariance * self.transition.transpose() + self.process_noise;
    }

    fn update(&mut self, observed: Vector3<f64>) {
        let innovation = observed - self.measurement * self.state;
        let innovation_cov = self.measurement * self.covariance * self.measurement.transpose() + self.measurement_noise;

        // Only singular once the state has gone non-finite
        let Some(inverse) = innovation_cov.try_inverse() else {
            log::warn!("Singular innovation covariance; measurement ignored");
            return;
        };
        let gain = self.covariance * self.measurement.transpose() * inverse;

        self.state += gain * innovation;
        self.covariance = (Matrix6::identity() - gain * self.measurement) * self.covariance;
    }
}

impl Default for ConstantVelocityKalman {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl PupilFilter for ConstantVelocityKalman {
    fn apply(&mut self, measurement: Measurement) -> Measurement {
        let observed = Vector3::new(measurement.x, measurement.y, measurement.diameter);
        if self.initialized {
            self.predict();
            self.update(observed);
        } else {
            self.state = Vector6::new(observed[0], observed[1], observed[2], 0.0, 0.0, 0.0);
            self.covariance = Matrix6::identity() * self.initial_uncertainty;
            self.initialized = true;
        }
        Measurement::new(self.state[0], self.state[1], self.state[2])
    }

    fn reset(&mut self) {
        self.state = Vector6::zeros();
        self.covariance = Matrix6::identity() * self.initial_uncertainty;
        self.initialized = false;
    }

    fn name(&self) -> &str {
        "ConstantVelocityKalman"
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_measurement_initializes() {
        let mut filter = ConstantVelocityKalman::default();
        let out = filter.apply(Measurement::new(10.0, 20.0, 8.0));
        assert_eq!(out, Measurement::new(10.0, 20.0, 8.0));
        assert_eq!(filter.velocity(), Vector3::zeros());
    }

    #[test]
    fn test_tracks_linear_motion() {
        let mut filter = ConstantVelocityKalman::default();
        let mut out = Measurement::new(0.0, 0.0, 0.0);
        for frame in 0..60 {
            let t = f64::from(frame);
            out = filter.apply(Measurement::new(100.0 + 2.0 * t, 50.0, 12.0));
        }
        // A constant-velocity model follows a ramp without steady-state lag
        assert!((out.x - 218.0).abs() < 2.0, "x = {}", out.x);
        assert!((filter.velocity()[0] - 2.0).abs() < 0.3);
        assert!((out.diameter - 12.0).abs() < 0.1);
    }

    #[test]
    fn test_reset() {
        let mut filter = ConstantVelocityKalman::default();
        filter.apply(Measurement::new(1.0, 2.0, 3.0));
        filter.apply(Measurement::new(2.0, 3.0, 4.0));
        filter.reset();
        assert!(!filter.is_initialized());
        assert_eq!(filter.apply(Measurement::new(9.0, 9.0, 9.0)), Measurement::new(9.0, 9.0, 9.0));
    }

    #[test]
    #[should_panic(expected = "Measurement noise must be positive")]
    fn test_invalid_noise_panics() {
        let config = FilterConfig { position_r: 0.0, ..FilterConfig::default() };
        let _ = ConstantVelocityKalman::from_config(&config);
    }
}
