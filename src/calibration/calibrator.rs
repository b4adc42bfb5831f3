//! Proportional-feedback parameter calibration.
//!
//! A deliberately simple corrective step: each matched parameter moves toward
//! its sensor reading by `learning_rate` of the relative error. Stands in for
//! a more advanced model-fitting stage that is out of scope here.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::constants::CALIBRATION_LEARNING_RATE;
use crate::domain::{CalibrationOutcome, CalibrationResult, PhysicsParams};

/// Reality-calibration engine.
#[derive(Debug, Clone, Copy)]
pub struct Calibrator {
    pub learning_rate: f64,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self { learning_rate: CALIBRATION_LEARNING_RATE }
    }
}

impl Calibrator {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// Runs one calibration cycle.
    ///
    /// For each parameter present in both maps (and non-zero, so relative
    /// error is defined): correction = learning_rate * (sensor - current) /
    /// |current|, applied multiplicatively. `predictions` is reserved for a
    /// model-based comparison step and does not affect the proportional
    /// update.
    pub fn calibrate(
        &self,
        current_params: &PhysicsParams,
        sensor_data: &PhysicsParams,
        _predictions: Option<&PhysicsParams>,
    ) -> CalibrationResult {
        let mut corrections: HashMap<String, f64> = HashMap::new();
        let mut new_params = current_params.clone();
        let mut readings_used = 0usize;

        for (name, &current) in current_params {
            if current == 0.0 {
                continue;
            }
            if let Some(&sensor) = sensor_data.get(name) {
                let error = (sensor - current) / current.abs();
                let correction = self.learning_rate * error;
                corrections.insert(name.clone(), correction);
                new_params.insert(name.clone(), current * (1.0 + correction));
                readings_used += 1;
            }
        }

        let drift_percentage = if corrections.is_empty() {
            0.0
        } else {
            corrections.values().map(|c| c.abs()).sum::<f64>() / corrections.len() as f64 * 100.0
        };

        let status = if readings_used > 0 {
            CalibrationOutcome::Calibrated
        } else {
            CalibrationOutcome::InsufficientData
        };
        debug!(readings_used, drift_percentage, ?status, "calibration cycle complete");

        CalibrationResult {
            drift_percentage,
            corrections_applied: corrections,
            new_physics_params: new_params,
            sensor_readings_used: readings_used,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, f64)]) -> PhysicsParams {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn correction_is_learning_rate_times_relative_error() {
        let calibrator = Calibrator::new(0.1);
        let current = params(&[("flow_rate", 10.0)]);
        let sensors = params(&[("flow_rate", 12.0)]);
        let result = calibrator.calibrate(&current, &sensors, None);

        // error = 0.2, correction = 0.02, new = 10 * 1.02
        let correction = result.corrections_applied["flow_rate"];
        assert!((correction - 0.02).abs() < 1e-12);
        assert!((result.new_physics_params["flow_rate"] - 10.2).abs() < 1e-9);
        assert_eq!(result.sensor_readings_used, 1);
        assert_eq!(result.status, CalibrationOutcome::Calibrated);
        assert!((result.drift_percentage - 2.0).abs() < 1e-9);
    }

    #[test]
    fn negative_current_values_use_absolute_denominator() {
        let calibrator = Calibrator::new(0.1);
        let current = params(&[("bias", -10.0)]);
        let sensors = params(&[("bias", -8.0)]);
        let result = calibrator.calibrate(&current, &sensors, None);
        // error = (-8 - -10)/10 = 0.2, new = -10 * 1.02
        assert!((result.new_physics_params["bias"] - -10.2).abs() < 1e-9);
    }

    #[test]
    fn unmatched_parameters_pass_through_unchanged() {
        let calibrator = Calibrator::default();
        let current = params(&[("a", 1.0), ("b", 2.0)]);
        let sensors = params(&[("a", 1.1)]);
        let result = calibrator.calibrate(&current, &sensors, None);
        assert_eq!(result.new_physics_params["b"], 2.0);
        assert_eq!(result.sensor_readings_used, 1);
    }

    #[test]
    fn no_matching_sensors_is_insufficient_data_not_an_error() {
        let calibrator = Calibrator::default();
        let current = params(&[("a", 1.0)]);
        let sensors = params(&[("z", 9.0)]);
        let result = calibrator.calibrate(&current, &sensors, None);
        assert_eq!(result.status, CalibrationOutcome::InsufficientData);
        assert!(result.corrections_applied.is_empty());
        assert_eq!(result.drift_percentage, 0.0);
        assert_eq!(result.new_physics_params, current);
    }

    #[test]
    fn zero_valued_parameters_are_never_divided() {
        let calibrator = Calibrator::default();
        let current = params(&[("offset", 0.0)]);
        let sensors = params(&[("offset", 3.0)]);
        let result = calibrator.calibrate(&current, &sensors, None);
        assert_eq!(result.status, CalibrationOutcome::InsufficientData);
        assert_eq!(result.new_physics_params["offset"], 0.0);
    }
}
