//! Proportional duty-cycle controller
//!
//! The ratio `duty / utilization` is the observed gain of the actuator: how
//! much duty cycle it currently takes to produce one unit of host load.
//! Rescaling that gain by the setpoint gives the duty cycle that should
//! produce exactly `setpoint` load:
//!
//! ```text
//! new_duty = clamp(duty / utilization * setpoint, cpu_min, cpu_max)
//! ```
//!
//! A zero reading drives the raw value to infinity, which the clamp turns
//! into `cpu_max`. There is no integral or derivative term.

use crate::config::ThrottleConfig;

/// Setpoint and bounds of the control law
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyCycleController {
    setpoint: f64,
    cpu_min: f64,
    cpu_max: f64,
}

impl DutyCycleController {
    pub fn new(setpoint: f64, cpu_min: f64, cpu_max: f64) -> Self {
        Self {
            setpoint,
            cpu_min,
            cpu_max,
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.setpoint, config.cpu_min, config.cpu_max)
    }

    /// Duty cycle the loop starts from
    pub fn initial_target(&self) -> f64 {
        self.clamp(self.setpoint)
    }

    /// Unclamped output of the control law
    pub fn raw_update(&self, utilization: f64, current_target: f64) -> f64 {
        current_target / utilization * self.setpoint
    }

    /// Next duty cycle, always within `[cpu_min, cpu_max]`
    pub fn update(&self, utilization: f64, current_target: f64) -> f64 {
        self.clamp(self.raw_update(utilization, current_target))
    }

    /// Bound a duty cycle; NaN maps to `cpu_max` so workloads are never starved
    pub fn clamp(&self, target: f64) -> f64 {
        if target.is_nan() {
            return self.cpu_max;
        }
        target.clamp(self.cpu_min, self.cpu_max)
    }
}

impl Default for DutyCycleController {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_at_setpoint_keeps_target() {
        let c = DutyCycleController::default();
        let t = c.update(0.30, 0.30);
        assert!((t - 0.30).abs() < EPS);
        let t = c.update(0.30, 0.55);
        assert!((t - 0.55).abs() < EPS);
    }

    #[test]
    fn test_monotonic_in_utilization() {
        let c = DutyCycleController::default();
        for &target in &[0.01, 0.1, 0.3, 0.75, 1.0] {
            let mut previous = f64::INFINITY;
            for step in 1..=100 {
                let u = step as f64 / 100.0;
                let raw = c.raw_update(u, target);
                assert!(raw < previous, "u={} t={} raw={}", u, target, raw);
                previous = raw;
            }
        }
    }

    #[test]
    fn test_output_always_in_bounds() {
        let c = DutyCycleController::default();
        let readings = [0.0, 1e-300, 1e-9, 0.001, 0.3, 0.99, 1.0];
        let targets = [0.01, 0.3, 1.0];
        for &u in &readings {
            for &t in &targets {
                let next = c.update(u, t);
                assert!((0.01..=1.0).contains(&next), "u={} t={} next={}", u, t, next);
            }
        }
    }

    #[test]
    fn test_zero_utilization_clamps_to_max() {
        let c = DutyCycleController::default();
        assert!(c.raw_update(0.0, 0.3).is_infinite());
        assert_eq!(c.update(0.0, 0.3), 1.0);
    }

    #[test]
    fn test_nan_clamps_to_max() {
        let c = DutyCycleController::default();
        assert_eq!(c.update(f64::NAN, 0.3), 1.0);
        assert_eq!(c.clamp(f64::NAN), 1.0);
    }

    #[test]
    fn test_busy_host_drives_target_down() {
        let c = DutyCycleController::default();
        let t = c.update(1.0, 1.0);
        assert!((t - 0.30).abs() < EPS);
        let t = c.update(1.0, t);
        assert!((t - 0.09).abs() < EPS);
    }
}
