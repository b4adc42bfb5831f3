//! Reality calibration: drift detection, proportional correction, per-asset
//! state, and physics-based sensor imputation.

mod calibrator;
mod drift;
mod imputation;
mod state;

pub use calibrator::Calibrator;
pub use drift::{DriftDetector, DriftSample};
pub use imputation::{ImputationMethod, ImputedReading, PhysicsImputer, SensorReading};
pub use state::{CalibrationService, CalibrationState, ObservationOutcome};
