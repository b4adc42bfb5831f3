//! Per-asset calibration state and the serialized update path.
//!
//! Each asset owns exactly one `CalibrationState`. Concurrent calibration of
//! the same asset must not interleave (lost drift history, skewed counts), so
//! all mutation goes through `CalibrationService`, which holds the states
//! behind one lock: single-writer per asset.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::constants::DRIFT_HISTORY_CAPACITY;
use crate::domain::{CalibrationOutcome, CalibrationResult, CalibrationStatus, PhysicsParams};

use super::calibrator::Calibrator;
use super::drift::{DriftDetector, DriftSample};

/// Calibration lifecycle record for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub asset_id: String,
    pub physics_params: PhysicsParams,
    drift_history: Vec<DriftSample>,
    pub last_calibrated_at: Option<DateTime<Utc>>,
    pub calibration_count: u64,
    pub status: CalibrationStatus,
}

impl CalibrationState {
    pub fn new(asset_id: impl Into<String>, physics_params: PhysicsParams) -> Self {
        Self {
            asset_id: asset_id.into(),
            physics_params,
            drift_history: Vec::new(),
            last_calibrated_at: None,
            calibration_count: 0,
            status: CalibrationStatus::Uncalibrated,
        }
    }

    /// Appends a drift observation, evicting the oldest entries beyond the
    /// rolling window.
    pub fn push_drift(&mut self, drift_pct: f64, at: DateTime<Utc>) {
        self.drift_history.push(DriftSample { drift_pct, at });
        if self.drift_history.len() > DRIFT_HISTORY_CAPACITY {
            let excess = self.drift_history.len() - DRIFT_HISTORY_CAPACITY;
            self.drift_history.drain(..excess);
        }
    }

    pub fn drift_history(&self) -> &[DriftSample] {
        &self.drift_history
    }

    fn record_success(&mut self, result: &CalibrationResult, at: DateTime<Utc>) {
        self.physics_params = result.new_physics_params.clone();
        self.last_calibrated_at = Some(at);
        self.calibration_count += 1;
        self.status = CalibrationStatus::Calibrated;
    }
}

/// Outcome of one `observe` cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationOutcome {
    pub drift_pct: f64,
    pub status: CalibrationStatus,
    /// Present when the cycle triggered a corrective calibration.
    pub recalibration: Option<CalibrationResult>,
}

/// Serialized access to every asset's calibration state.
pub struct CalibrationService {
    detector: DriftDetector,
    calibrator: Calibrator,
    states: Mutex<HashMap<String, CalibrationState>>,
}

impl Default for CalibrationService {
    fn default() -> Self {
        Self::new(DriftDetector::default(), Calibrator::default())
    }
}

impl CalibrationService {
    pub fn new(detector: DriftDetector, calibrator: Calibrator) -> Self {
        Self {
            detector,
            calibrator,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CalibrationState>> {
        // A poisoned lock only means another calibration cycle panicked;
        // the map itself is still usable.
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an asset's initial physics parameters, creating its state on
    /// first sight. Re-registering an existing asset leaves it untouched.
    pub fn register_asset(&self, asset_id: &str, initial_params: PhysicsParams) {
        let mut states = self.lock();
        states
            .entry(asset_id.to_string())
            .or_insert_with(|| CalibrationState::new(asset_id, initial_params));
    }

    /// Clone of the asset's current state, if any.
    pub fn snapshot(&self, asset_id: &str) -> Option<CalibrationState> {
        self.lock().get(asset_id).cloned()
    }

    /// Forces a calibration cycle against the asset's current parameters.
    ///
    /// A first successful cycle moves the asset Uncalibrated -> Calibrated.
    pub fn calibrate_now(&self, asset_id: &str, sensor_data: &PhysicsParams) -> CalibrationResult {
        let mut states = self.lock();
        let state = states
            .entry(asset_id.to_string())
            .or_insert_with(|| CalibrationState::new(asset_id, PhysicsParams::new()));

        let result = self.calibrator.calibrate(&state.physics_params, sensor_data, None);
        if result.status == CalibrationOutcome::Calibrated {
            state.record_success(&result, Utc::now());
            info!(asset_id, count = state.calibration_count, "asset calibrated");
        }
        result
    }

    /// Records one drift observation and recalibrates when the drift has been
    /// sustained.
    ///
    /// Status transitions: Calibrated -> Drifting when the sustained window
    /// trips; Drifting -> Recalibrating -> Calibrated once the corrective
    /// cycle applies at least one correction.
    pub fn observe(&self, asset_id: &str, sensor_data: &PhysicsParams) -> ObservationOutcome {
        let mut states = self.lock();
        let state = states
            .entry(asset_id.to_string())
            .or_insert_with(|| CalibrationState::new(asset_id, PhysicsParams::new()));

        let drift_pct = self.detector.compute_drift(&state.physics_params, sensor_data);
        state.push_drift(drift_pct, Utc::now());
        debug!(asset_id, drift_pct, "drift observation recorded");

        let mut recalibration = None;
        if self.detector.should_recalibrate(state.drift_history()) {
            state.status = CalibrationStatus::Recalibrating;
            let result = self.calibrator.calibrate(&state.physics_params, sensor_data, None);
            if result.status == CalibrationOutcome::Calibrated {
                state.record_success(&result, Utc::now());
                info!(asset_id, drift_pct, "sustained drift corrected");
            } else {
                // Nothing matched; the asset stays flagged as drifting.
                state.status = CalibrationStatus::Drifting;
            }
            recalibration = Some(result);
        }

        ObservationOutcome {
            drift_pct,
            status: state.status,
            recalibration,
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
    fn history_is_bounded_to_the_rolling_window() {
        let mut state = CalibrationState::new("a-1", PhysicsParams::new());
        for i in 0..250 {
            state.push_drift(i as f64, Utc::now());
        }
        assert_eq!(state.drift_history().len(), DRIFT_HISTORY_CAPACITY);
        // Oldest entries were evicted; the tail is the most recent insert.
        assert_eq!(state.drift_history()[0].drift_pct, 150.0);
        assert_eq!(state.drift_history().last().unwrap().drift_pct, 249.0);
    }

    #[test]
    fn first_successful_calibration_transitions_from_uncalibrated() {
        let service = CalibrationService::default();
        service.register_asset("a-1", params(&[("flow_rate", 10.0)]));
        assert_eq!(service.snapshot("a-1").unwrap().status, CalibrationStatus::Uncalibrated);

        let result = service.calibrate_now("a-1", &params(&[("flow_rate", 11.0)]));
        assert_eq!(result.status, CalibrationOutcome::Calibrated);

        let state = service.snapshot("a-1").unwrap();
        assert_eq!(state.status, CalibrationStatus::Calibrated);
        assert_eq!(state.calibration_count, 1);
        assert!(state.last_calibrated_at.is_some());
        assert!(state.physics_params["flow_rate"] > 10.0);
    }

    #[test]
    fn insufficient_data_does_not_advance_the_lifecycle() {
        let service = CalibrationService::default();
        service.register_asset("a-1", params(&[("flow_rate", 10.0)]));
        let result = service.calibrate_now("a-1", &params(&[("unrelated", 1.0)]));
        assert_eq!(result.status, CalibrationOutcome::InsufficientData);
        let state = service.snapshot("a-1").unwrap();
        assert_eq!(state.status, CalibrationStatus::Uncalibrated);
        assert_eq!(state.calibration_count, 0);
    }

    #[test]
    fn sustained_drift_triggers_recalibration() {
        let service = CalibrationService::new(DriftDetector::new(5.0, 3), Calibrator::default());
        service.register_asset("a-1", params(&[("flow_rate", 10.0)]));
        service.calibrate_now("a-1", &params(&[("flow_rate", 10.0)]));

        // 20% off: three consecutive over-threshold observations.
        let drifted = params(&[("flow_rate", 12.0)]);
        let first = service.observe("a-1", &drifted);
        assert!(first.recalibration.is_none());
        service.observe("a-1", &drifted);
        let third = service.observe("a-1", &drifted);

        let result = third.recalibration.expect("third sustained observation recalibrates");
        assert_eq!(result.status, CalibrationOutcome::Calibrated);
        assert_eq!(third.status, CalibrationStatus::Calibrated);

        let state = service.snapshot("a-1").unwrap();
        assert!(state.physics_params["flow_rate"] > 10.0);
        assert_eq!(state.calibration_count, 2);
    }

    #[test]
    fn one_state_per_asset() {
        let service = CalibrationService::default();
        service.register_asset("a-1", params(&[("x", 1.0)]));
        service.register_asset("a-1", params(&[("x", 99.0)]));
        let state = service.snapshot("a-1").unwrap();
        assert_eq!(state.physics_params["x"], 1.0);
    }
}
