//! Neutral installation model.
//!
//! BIM/CAD-independent description of a brine-spray installation: road
//! segments, spray devices, the supply system, and underground utilities.
//! Fully JSON-serializable so a project survives a round trip through
//! external storage field-for-field, enum tags included.

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Straight,
    Curve,
    Bridge,
    Overpass,
    Underpass,
    Ramp,
    Intersection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMaterial {
    Asphalt,
    Concrete,
    SteelDeck,
}

/// One road segment under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub segment_id: String,
    pub road_type: RoadType,
    pub surface_material: SurfaceMaterial,
    pub length_m: f64,
    pub width_m: f64,
    pub lanes: u32,
    pub slope_percent: f64,
    pub elevation_m: f64,
    #[serde(default)]
    pub has_median: bool,
    #[serde(default = "default_true")]
    pub has_shoulder: bool,
    #[serde(default = "default_shoulder_width")]
    pub shoulder_width_m: f64,
}

fn default_true() -> bool {
    true
}

fn default_shoulder_width() -> f64 {
    2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprayPattern {
    Linear,
    Fan,
    FullCircle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationType {
    SurfaceMounted,
    FlushMounted,
    Buried,
}

/// A single brine spray unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrineSprayDevice {
    pub device_id: String,
    /// Distance from the road start (m).
    pub position_along_road_m: f64,
    /// Lateral offset from the road centerline (m).
    pub position_cross_m: f64,
    pub installation_type: InstallationType,
    /// Burial depth (mm); 0 means surface installation.
    pub burial_depth_mm: f64,
    pub spray_pattern: SprayPattern,
    pub spray_angle_deg: f64,
    pub spray_range_m: f64,
    pub flow_rate_lpm: f64,
    pub nozzle_diameter_mm: f64,
    pub brine_concentration_percent: f64,
}

/// Brine storage and distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplySystem {
    pub tank_capacity_l: f64,
    pub pump_pressure_bar: f64,
    pub pipe_diameter_mm: f64,
    pub pipe_material: String,
    pub pipe_burial_depth_mm: f64,
    #[serde(default)]
    pub has_heating: bool,
    #[serde(default)]
    pub has_insulation: bool,
}

/// A buried third-party line the installation must keep clear of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndergroundUtility {
    pub utility_id: String,
    /// gas, water, electric, telecom, sewer.
    pub utility_type: String,
    pub depth_mm: f64,
    pub position_cross_m: f64,
    pub diameter_mm: f64,
}

/// Top-level project model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationProject {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub road_segments: Vec<RoadSegment>,
    #[serde(default)]
    pub spray_devices: Vec<BrineSprayDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_system: Option<SupplySystem>,
    #[serde(default)]
    pub underground_utilities: Vec<UndergroundUtility>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for SimulationProject {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            project_id: String::new(),
            project_name: String::new(),
            location_name: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            road_segments: Vec::new(),
            spray_devices: Vec::new(),
            supply_system: None,
            underground_utilities: Vec::new(),
        }
    }
}

impl SimulationProject {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
