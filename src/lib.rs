//! Anti-icing brine-spray design evaluation.
//!
//! This crate judges whether an engineered brine-spray installation (road
//! segments, spray devices, supply piping, underground utilities) will work
//! under adverse winter conditions. Two evaluation paths are provided:
//!
//! - the probabilistic pipeline: physics prediction, Monte Carlo uncertainty
//!   propagation, and a PASS/WARNING/FAIL judge with reasoned output;
//! - a deterministic failure-first rule engine over a concrete coverage
//!   simulation.
//!
//! A drift detector and proportional calibrator close the loop between live
//! sensor readings and the physics parameters used on the next run.

pub mod calibration;
pub mod climate;
pub mod decision;
pub mod domain;
pub mod judgment;
pub mod physics;
pub mod project;
pub mod simulation;
pub mod site;
pub mod spraysim;

#[cfg(test)]
mod testutil;

pub use calibration::{CalibrationService, Calibrator, DriftDetector, PhysicsImputer};
pub use decision::{Judge, MonteCarloEngine, MonteCarloSummary};
pub use domain::{
    DecisionResult, EnvironmentCondition, PhysicsAsset, SimulationInput, SimulationType, Verdict,
};
pub use judgment::{evaluate, JudgmentResult, RuleVerdict};
pub use physics::{
    engine_for, GridCoverageEngine, PhysicsEngine, Prediction, SprayTrajectoryEngine, ThermalEngine,
};
pub use project::SimulationProject;
pub use simulation::{run_decision, run_rule_judgment, SimulationError};
pub use site::EnvironmentContext;
pub use spraysim::{run_full_simulation, SimulationResult};
