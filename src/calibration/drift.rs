//! Drift detection between physics parameters and live sensor readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::constants::{DRIFT_SUSTAINED_MINUTES, DRIFT_THRESHOLD_PCT};
use crate::domain::PhysicsParams;

/// One drift observation for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftSample {
    pub drift_pct: f64,
    pub at: DateTime<Utc>,
}

/// Monitors the gap between physics predictions and sensor reality.
#[derive(Debug, Clone, Copy)]
pub struct DriftDetector {
    pub threshold_pct: f64,
    pub sustained_minutes: usize,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self {
            threshold_pct: DRIFT_THRESHOLD_PCT,
            sustained_minutes: DRIFT_SUSTAINED_MINUTES,
        }
    }
}

impl DriftDetector {
    pub fn new(threshold_pct: f64, sustained_minutes: usize) -> Self {
        Self { threshold_pct, sustained_minutes }
    }

    /// Mean relative divergence (%) across parameters present in both maps.
    ///
    /// Zero-valued physics parameters are skipped so the relative error stays
    /// defined. Returns 0.0 when nothing matches.
    pub fn compute_drift(&self, physics_params: &PhysicsParams, sensor_data: &PhysicsParams) -> f64 {
        if physics_params.is_empty() || sensor_data.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        let mut count = 0usize;
        for (name, &predicted) in physics_params {
            if predicted == 0.0 {
                continue;
            }
            if let Some(&actual) = sensor_data.get(name) {
                total += (actual - predicted).abs() / predicted.abs() * 100.0;
                count += 1;
            }
        }

        if count > 0 {
            total / count as f64
        } else {
            0.0
        }
    }

    /// True when the most recent `sustained_minutes` observations all exceed
    /// the threshold. A shorter history never triggers.
    pub fn should_recalibrate(&self, drift_history: &[DriftSample]) -> bool {
        if drift_history.len() < self.sustained_minutes {
            return false;
        }
        drift_history[drift_history.len() - self.sustained_minutes..]
            .iter()
            .all(|sample| sample.drift_pct > self.threshold_pct)
    }
}
