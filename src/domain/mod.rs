//! Domain layer: constants, enumerations, and serializable value types.

pub mod constants;
mod enums;
mod models;

pub use enums::{AssetType, CalibrationStatus, SensorType, SimulationType, Verdict};
pub use models::{
    CalibrationOutcome, CalibrationResult, ClimatePreset, CoverageResult, DecisionResult,
    EnvironmentCondition, LineSegment, PhysicsAsset, PhysicsParams, Point3D, RoadSegmentParams,
    SafetyFactorDetails, SimulationInput, SprayDeviceParams,
};
