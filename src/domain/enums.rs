//! Core enumerations for the decision engine.

use serde::{Deserialize, Serialize};

/// Kind of physical asset participating in a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    RoadSegment,
    SprayDevice,
    SupplySystem,
    BridgePier,
    JetFan,
    Curb,
}

/// Final classification of a probabilistic decision run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Warning,
    Fail,
}

impl Verdict {
    /// Wire-format name, matching the serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Warning => "WARNING",
            Verdict::Fail => "FAIL",
        }
    }
}

/// Which physics engine a simulation request selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationType {
    SaltSpray,
    Thermal,
    Structural,
    Fluid,
}

impl SimulationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationType::SaltSpray => "salt_spray",
            SimulationType::Thermal => "thermal",
            SimulationType::Structural => "structural",
            SimulationType::Fluid => "fluid",
        }
    }
}

/// Sensor channels the calibration loop can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
    WindSpeed,
    WindDirection,
    Strain,
    Displacement,
    Pressure,
    FlowRate,
}

/// Lifecycle of a per-asset calibration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    Uncalibrated,
    Calibrated,
    Drifting,
    Recalibrating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Verdict::Pass).unwrap(), "\"PASS\"");
        assert_eq!(serde_json::to_string(&Verdict::Fail).unwrap(), "\"FAIL\"");
        assert_eq!(Verdict::Warning.as_str(), "WARNING");
    }

    #[test]
    fn asset_type_round_trips_snake_case() {
        let json = serde_json::to_string(&AssetType::SprayDevice).unwrap();
        assert_eq!(json, "\"spray_device\"");
        let back: AssetType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AssetType::SprayDevice);
    }

    #[test]
    fn simulation_type_tags() {
        assert_eq!(SimulationType::SaltSpray.as_str(), "salt_spray");
        let parsed: SimulationType = serde_json::from_str("\"thermal\"").unwrap();
        assert_eq!(parsed, SimulationType::Thermal);
    }
}
