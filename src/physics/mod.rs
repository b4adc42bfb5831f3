//! Physics engine family.
//!
//! Each engine maps (assets, environment, optional calibrated parameters) to a
//! prediction bundle and independently reduces that bundle to a safety factor.
//! The trait-based design lets the Monte Carlo engine and the judge drive any
//! variant through one contract.

mod coverage;
mod spray;
mod thermal;

pub use coverage::GridCoverageEngine;
pub use spray::SprayTrajectoryEngine;
pub use thermal::ThermalEngine;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{EnvironmentCondition, PhysicsAsset, PhysicsParams, SimulationType};

/// Errors a physics engine can raise during prediction.
///
/// Missing asset properties are never an error (defaults are substituted);
/// these cover genuinely unusable inputs.
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("asset '{asset_id}' has invalid {property}: {value}")]
    InvalidProperty {
        asset_id: String,
        property: &'static str,
        value: f64,
    },
    #[error("non-finite {quantity} in {engine} prediction")]
    NonFinite {
        engine: &'static str,
        quantity: &'static str,
    },
    #[error("simulation type '{0}' has no physics engine")]
    UnsupportedSimulation(&'static str),
}

/// Where a single droplet came to rest, in road-plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingPoint {
    pub x: f64,
    pub y: f64,
}

/// Cell statistics from the rasterized coverage variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub grid_coverage: f64,
    pub grid_size: (usize, usize),
    pub covered_cells: usize,
    pub total_cells: usize,
}

/// Prediction bundle from the spray-trajectory and grid-coverage engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePrediction {
    pub landing_points: Vec<LandingPoint>,
    /// Covered fraction of the road footprint, in [0, 1].
    pub coverage_ratio: f64,
    pub total_coverage_area: f64,
    pub total_road_area: f64,
    /// Nozzle exit velocity of the last simulated device (m/s).
    pub spray_velocity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridStats>,
}

/// Prediction bundle from the thermal engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalPrediction {
    pub surface_temperature: f64,
    pub air_temperature: f64,
    pub freezing_point: f64,
    pub freezing_point_depression: f64,
    pub brine_concentration: f64,
    pub is_icing: bool,
    pub is_warning: bool,
    pub temperature_margin: f64,
    pub convective_coeff: f64,
}

/// Engine-specific prediction results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prediction {
    Coverage(CoveragePrediction),
    Thermal(ThermalPrediction),
}

/// Contract implemented by every physics engine variant.
pub trait PhysicsEngine: Send + Sync {
    /// Runs a physics prediction.
    ///
    /// Deterministic given identical inputs: engines that sample internally
    /// derive their random source from a fixed per-engine seed, so repeated
    /// calls reproduce the same bundle.
    fn predict(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
        params: Option<&PhysicsParams>,
    ) -> Result<Prediction, PhysicsError>;

    /// Reduces a prediction to a safety factor (capacity / demand).
    ///
    /// Non-negative; `f64::INFINITY` when the required demand is zero. A
    /// prediction bundle from a different engine family yields 0.0 rather
    /// than panicking.
    fn safety_factor(&self, prediction: &Prediction, environment: &EnvironmentCondition) -> f64;
}

/// Selects the engine for a requested simulation type.
pub fn engine_for(simulation_type: SimulationType) -> Result<Box<dyn PhysicsEngine>, PhysicsError> {
    match simulation_type {
        SimulationType::SaltSpray => Ok(Box::new(GridCoverageEngine::default())),
        SimulationType::Thermal => Ok(Box::new(ThermalEngine::default())),
        SimulationType::Fluid => Ok(Box::new(SprayTrajectoryEngine::default())),
        SimulationType::Structural => {
            Err(PhysicsError::UnsupportedSimulation(simulation_type.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_selection_covers_supported_types() {
        assert!(engine_for(SimulationType::SaltSpray).is_ok());
        assert!(engine_for(SimulationType::Thermal).is_ok());
        assert!(engine_for(SimulationType::Fluid).is_ok());
        assert!(engine_for(SimulationType::Structural).is_err());
    }
}
