//! Domain value types for the computation engine.
//!
//! These are the serializable shapes exchanged with the surrounding service
//! layer. They describe the computational domain only; persistence concerns
//! live outside this crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::{
    DEFAULT_BRINE_CONCENTRATION, DEFAULT_DECISION_SEED, DEFAULT_FLOW_RATE, DEFAULT_MOUNTING_HEIGHT,
    DEFAULT_NOZZLE_DIAMETER, DEFAULT_PUMP_PRESSURE, DEFAULT_SPRAY_ANGLE, KDS_MIN_SAFETY_FACTOR,
    MONTE_CARLO_N,
};
use super::enums::{AssetType, SimulationType, Verdict};

/// Calibrated physics parameters keyed by name.
pub type PhysicsParams = HashMap<String, f64>;

// ===== Geometry =====

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point3D,
    pub end: Point3D,
}

impl LineSegment {
    /// Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let dz = self.end.z - self.start.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// ===== Environment =====

/// Ambient conditions for one simulation run or one Monte Carlo sample.
///
/// Value type: created fresh per run/sample and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentCondition {
    /// Air temperature (°C).
    pub temperature: f64,
    /// Relative humidity (%, 0-100).
    pub humidity: f64,
    /// Wind speed (m/s, >= 0).
    pub wind_speed: f64,
    /// Wind direction (degrees from North, wraps at 360).
    pub wind_direction: f64,
    /// Precipitation rate (mm/h, >= 0).
    pub precipitation: f64,
    /// Solar radiation (W/m^2, >= 0).
    pub solar_radiation: f64,
    /// Measured road surface temperature (°C), when a sensor provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_surface_temp: Option<f64>,
}

impl Default for EnvironmentCondition {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            humidity: 70.0,
            wind_speed: 3.0,
            wind_direction: 0.0,
            precipitation: 0.0,
            solar_radiation: 0.0,
            road_surface_temp: None,
        }
    }
}

/// Named regional climate bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimatePreset {
    pub name: String,
    pub region: String,
    pub conditions: EnvironmentCondition,
}

// ===== Assets =====

/// A physical entity handed to the physics engines.
///
/// Constructed from persisted asset records immediately before a run and
/// discarded afterwards; the core never mutates it. The property bag is
/// engine-interpreted; engines substitute documented defaults for missing
/// keys rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsAsset {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl PhysicsAsset {
    pub fn new(id: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            id: id.into(),
            asset_type,
            name: None,
            geometry: None,
            properties: HashMap::new(),
        }
    }

    /// Numeric property lookup with a default for missing or non-numeric values.
    pub fn prop_f64(&self, key: &str, default: f64) -> f64 {
        self.properties.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Integer property lookup with a default.
    pub fn prop_u32(&self, key: &str, default: u32) -> u32 {
        self.properties
            .get(key)
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(default)
    }

    /// String property lookup with a default.
    pub fn prop_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.properties.get(key).and_then(Value::as_str).unwrap_or(default)
    }
}

/// Typed view over a spray device's property bag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprayDeviceParams {
    pub nozzle_diameter: f64,   // m
    pub spray_angle: f64,       // degrees
    pub flow_rate: f64,         // L/min
    pub pump_pressure: f64,     // Pa
    pub brine_concentration: f64, // %
    pub mounting_height: f64,   // m
    pub orientation: f64,       // degrees
}

impl Default for SprayDeviceParams {
    fn default() -> Self {
        Self {
            nozzle_diameter: DEFAULT_NOZZLE_DIAMETER,
            spray_angle: DEFAULT_SPRAY_ANGLE,
            flow_rate: DEFAULT_FLOW_RATE,
            pump_pressure: DEFAULT_PUMP_PRESSURE,
            brine_concentration: DEFAULT_BRINE_CONCENTRATION,
            mounting_height: DEFAULT_MOUNTING_HEIGHT,
            orientation: 0.0,
        }
    }
}

impl SprayDeviceParams {
    /// Reads device parameters from the asset's property bag, substituting
    /// defaults for anything absent.
    pub fn from_asset(asset: &PhysicsAsset) -> Self {
        let d = Self::default();
        Self {
            nozzle_diameter: asset.prop_f64("nozzle_diameter", d.nozzle_diameter),
            spray_angle: asset.prop_f64("spray_angle", d.spray_angle),
            flow_rate: asset.prop_f64("flow_rate", d.flow_rate),
            pump_pressure: asset.prop_f64("pump_pressure", d.pump_pressure),
            brine_concentration: asset.prop_f64("brine_concentration", d.brine_concentration),
            mounting_height: asset.prop_f64("mounting_height", d.mounting_height),
            orientation: asset.prop_f64("orientation", d.orientation),
        }
    }
}

/// Typed view over a road segment's property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegmentParams {
    pub length: f64, // m
    pub width: f64,  // m
    pub lanes: u32,
    pub slope: f64, // %
    pub surface_material: String,
}

impl RoadSegmentParams {
    pub fn from_asset(asset: &PhysicsAsset) -> Self {
        Self {
            length: asset.prop_f64("length", super::constants::DEFAULT_ROAD_LENGTH),
            width: asset.prop_f64("width", super::constants::DEFAULT_ROAD_WIDTH),
            lanes: asset.prop_u32("lanes", 2),
            slope: asset.prop_f64("slope", 0.0),
            surface_material: asset.prop_str("surface_material", "asphalt").to_string(),
        }
    }
}

// ===== Simulation I/O =====

/// Input to the decision pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub project_id: String,
    pub simulation_type: SimulationType,
    pub assets: Vec<PhysicsAsset>,
    pub environment: EnvironmentCondition,
    #[serde(default = "default_safety_target")]
    pub safety_factor_target: f64,
    #[serde(default = "default_monte_carlo_n")]
    pub monte_carlo_n: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_params: Option<PhysicsParams>,
}

fn default_safety_target() -> f64 {
    KDS_MIN_SAFETY_FACTOR
}

fn default_monte_carlo_n() -> usize {
    MONTE_CARLO_N
}

fn default_seed() -> u64 {
    DEFAULT_DECISION_SEED
}

/// Coverage summary for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub coverage_ratio: f64, // 0.0 to 1.0
    pub coverage_area: f64,  // m^2
    pub total_area: f64,     // m^2
}

// ===== Decision output =====

/// Distribution detail attached to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyFactorDetails {
    pub std_sf: f64,
    pub min_sf: f64,
    pub max_sf: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
}

/// The final decision, produced once per judge invocation and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub verdict: Verdict,
    pub failure_probability: f64,
    pub mean_safety_factor: f64,
    pub safety_factor_target: f64,
    pub ucl_95: f64,
    pub monte_carlo_n: usize,
    pub details: SafetyFactorDetails,
    pub reasoning: String,
}

// ===== Calibration output =====

/// Whether a calibration cycle applied corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationOutcome {
    Calibrated,
    InsufficientData,
}

/// Result of one calibration cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub drift_percentage: f64,
    pub corrections_applied: HashMap<String, f64>,
    pub new_physics_params: PhysicsParams,
    pub sensor_readings_used: usize,
    pub status: CalibrationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn environment_defaults_match_documented_values() {
        let env = EnvironmentCondition::default();
        assert_eq!(env.temperature, 0.0);
        assert_eq!(env.humidity, 70.0);
        assert_eq!(env.wind_speed, 3.0);
        assert!(env.road_surface_temp.is_none());
    }

    #[test]
    fn spray_params_substitute_defaults_for_missing_properties() {
        let asset = PhysicsAsset::new("spray-001", AssetType::SprayDevice);
        let params = SprayDeviceParams::from_asset(&asset);
        assert_eq!(params.nozzle_diameter, DEFAULT_NOZZLE_DIAMETER);
        assert_eq!(params.pump_pressure, DEFAULT_PUMP_PRESSURE);
        assert_eq!(params.orientation, 0.0);
    }

    #[test]
    fn spray_params_read_provided_properties() {
        let mut asset = PhysicsAsset::new("spray-001", AssetType::SprayDevice);
        asset.properties.insert("pump_pressure".into(), json!(500_000.0));
        asset.properties.insert("spray_angle".into(), json!(90));
        let params = SprayDeviceParams::from_asset(&asset);
        assert_eq!(params.pump_pressure, 500_000.0);
        assert_eq!(params.spray_angle, 90.0);
    }

    #[test]
    fn asset_round_trips_through_wire_shape() {
        let raw = json!({
            "id": "road-001",
            "type": "road_segment",
            "name": "Test Road",
            "properties": {"length": 100.0, "width": 7.0, "lanes": 2}
        });
        let asset: PhysicsAsset = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(asset.asset_type, AssetType::RoadSegment);
        let road = RoadSegmentParams::from_asset(&asset);
        assert_eq!(road.length, 100.0);
        assert_eq!(road.lanes, 2);

        let back = serde_json::to_value(&asset).unwrap();
        assert_eq!(back["type"], "road_segment");
        assert_eq!(back["properties"]["length"], 100.0);
    }

    #[test]
    fn simulation_input_defaults_apply() {
        let input: SimulationInput = serde_json::from_value(json!({
            "project_id": "p-1",
            "simulation_type": "salt_spray",
            "assets": [],
            "environment": {
                "temperature": -5.0, "humidity": 70.0, "wind_speed": 4.0,
                "wind_direction": 270.0, "precipitation": 2.0, "solar_radiation": 100.0
            }
        }))
        .unwrap();
        assert_eq!(input.safety_factor_target, KDS_MIN_SAFETY_FACTOR);
        assert_eq!(input.monte_carlo_n, MONTE_CARLO_N);
        assert_eq!(input.seed, DEFAULT_DECISION_SEED);
    }

    #[test]
    fn line_segment_length() {
        let seg = LineSegment {
            start: Point3D { x: 0.0, y: 0.0, z: 0.0 },
            end: Point3D { x: 3.0, y: 4.0, z: 0.0 },
        };
        assert!((seg.length() - 5.0).abs() < 1e-12);
    }
}
