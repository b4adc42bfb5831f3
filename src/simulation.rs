//! Simulation orchestration.
//!
//! Bridges a serialized request to the decision pipeline: validates the asset
//! list, selects the physics engine, and runs the Monte Carlo judge. The
//! deterministic rule-based path has its own entry point operating on a
//! neutral project model.

use thiserror::Error;
use tracing::info;

use crate::decision::{Judge, MonteCarloError};
use crate::domain::{AssetType, DecisionResult, SimulationInput};
use crate::judgment::{evaluate, JudgmentResult};
use crate::physics::{engine_for, PhysicsError};
use crate::project::SimulationProject;
use crate::site::EnvironmentContext;
use crate::spraysim::{run_full_simulation, SimulationResult, SpraySimError};

/// Client-visible failures of a simulation request.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("project has no road segments")]
    NoRoadSegments,
    #[error("project has no spray devices")]
    NoSprayDevices,
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    MonteCarlo(#[from] MonteCarloError),
}

impl From<SpraySimError> for SimulationError {
    fn from(err: SpraySimError) -> Self {
        match err {
            SpraySimError::NoRoadSegments => SimulationError::NoRoadSegments,
            SpraySimError::NoSprayDevices => SimulationError::NoSprayDevices,
        }
    }
}

/// Runs the probabilistic decision pipeline for one request.
///
/// Validation happens before any computation; an invalid request never
/// reaches the physics engines.
pub fn run_decision(input: &SimulationInput) -> Result<DecisionResult, SimulationError> {
    let has_road = input
        .assets
        .iter()
        .any(|a| a.asset_type == AssetType::RoadSegment);
    if !has_road {
        return Err(SimulationError::NoRoadSegments);
    }
    let has_device = input
        .assets
        .iter()
        .any(|a| a.asset_type == AssetType::SprayDevice);
    if !has_device {
        return Err(SimulationError::NoSprayDevices);
    }

    info!(
        project_id = %input.project_id,
        simulation_type = input.simulation_type.as_str(),
        n = input.monte_carlo_n,
        "running decision pipeline"
    );

    let engine = engine_for(input.simulation_type)?;
    let judge = Judge::new(engine, input.monte_carlo_n);
    let decision = judge.decide(
        &input.assets,
        &input.environment,
        input.safety_factor_target,
        input.calibration_params.as_ref(),
        input.seed,
    )?;
    Ok(decision)
}

/// Runs the deterministic rule-based path: concrete coverage simulation, then
/// the failure-first checklist.
pub fn run_rule_judgment(
    project: &SimulationProject,
    env: &EnvironmentContext,
    resolution_m: f64,
) -> Result<(SimulationResult, JudgmentResult), SimulationError> {
    let sim_result = run_full_simulation(project, env, resolution_m)?;
    let judgment = evaluate(project, env, &sim_result);
    Ok((sim_result, judgment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnvironmentCondition, PhysicsAsset, SimulationType, Verdict};
    use crate::testutil::{test_env, test_project};
    use serde_json::json;

    fn decision_input(with_road: bool, with_device: bool) -> SimulationInput {
        let mut assets = Vec::new();
        if with_road {
            let mut road = PhysicsAsset::new("road-001", AssetType::RoadSegment);
            road.properties.insert("length".into(), json!(100.0));
            road.properties.insert("width".into(), json!(7.0));
            assets.push(road);
        }
        if with_device {
            let mut dev = PhysicsAsset::new("spray-001", AssetType::SprayDevice);
            dev.properties.insert("pump_pressure".into(), json!(300000.0));
            assets.push(dev);
        }
        SimulationInput {
            project_id: "p-1".into(),
            simulation_type: SimulationType::SaltSpray,
            assets,
            environment: EnvironmentCondition {
                temperature: -5.0,
                wind_speed: 4.0,
                ..Default::default()
            },
            safety_factor_target: 1.5,
            monte_carlo_n: 30,
            seed: 42,
            calibration_params: None,
        }
    }

    #[test]
    fn missing_assets_fail_before_any_computation() {
        assert!(matches!(
            run_decision(&decision_input(false, true)),
            Err(SimulationError::NoRoadSegments)
        ));
        assert!(matches!(
            run_decision(&decision_input(true, false)),
            Err(SimulationError::NoSprayDevices)
        ));
    }

    #[test]
    fn valid_request_produces_a_decision() {
        let decision = run_decision(&decision_input(true, true)).unwrap();
        assert!(matches!(
            decision.verdict,
            Verdict::Pass | Verdict::Warning | Verdict::Fail
        ));
        assert_eq!(decision.monte_carlo_n, 30);
        assert!(!decision.reasoning.is_empty());
    }

    #[test]
    fn decision_result_serializes_to_the_documented_shape() {
        let decision = run_decision(&decision_input(true, true)).unwrap();
        let value = serde_json::to_value(&decision).unwrap();
        for key in [
            "verdict",
            "failure_probability",
            "mean_safety_factor",
            "safety_factor_target",
            "ucl_95",
            "monte_carlo_n",
            "details",
            "reasoning",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        for key in ["std_sf", "min_sf", "max_sf", "percentile_5", "percentile_95"] {
            assert!(value["details"].get(key).is_some(), "missing detail {key}");
        }
    }

    #[test]
    fn rule_judgment_path_runs_end_to_end() {
        let project = test_project(10, 100.0, 700.0);
        let env = test_env();
        let (sim, judgment) = run_rule_judgment(&project, &env, 1.0).unwrap();
        assert!(sim.coverage_ratio >= 0.0);
        let value = serde_json::to_value(&judgment).unwrap();
        for key in ["verdict", "confidence", "summary", "failures", "conditions", "limitations"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn structural_simulation_type_is_rejected() {
        let mut input = decision_input(true, true);
        input.simulation_type = SimulationType::Structural;
        assert!(matches!(
            run_decision(&input),
            Err(SimulationError::Physics(_))
        ));
    }
}
