//! The judge: PASS / WARNING / FAIL classification of Monte Carlo output.
//!
//! Decision rules, evaluated in order:
//! - FAIL:    Pf >= 20% or mean SF < 1.0
//! - WARNING: mean SF below target, or the 95% UCL violates 1.5x the target
//! - PASS:    otherwise

use tracing::info;

use crate::domain::constants::{
    DEFAULT_DECISION_SEED, FAIL_PROBABILITY_THRESHOLD, FAIL_SAFETY_FACTOR_THRESHOLD,
    PASS_SAFETY_FACTOR_TARGET,
};
use crate::domain::{
    DecisionResult, EnvironmentCondition, PhysicsAsset, PhysicsParams, SafetyFactorDetails,
    Verdict,
};
use crate::physics::PhysicsEngine;

use super::monte_carlo::{MonteCarloEngine, MonteCarloError};

/// Orchestrates Monte Carlo simulation and applies the classification rules.
pub struct Judge {
    mc_engine: MonteCarloEngine,
}

impl Judge {
    pub fn new(physics_engine: Box<dyn PhysicsEngine>, n_samples: usize) -> Self {
        Self {
            mc_engine: MonteCarloEngine::new(physics_engine, n_samples),
        }
    }

    pub fn from_monte_carlo(mc_engine: MonteCarloEngine) -> Self {
        Self { mc_engine }
    }

    /// Runs the Monte Carlo batch and classifies the result.
    pub fn decide(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
        safety_factor_target: f64,
        params: Option<&PhysicsParams>,
        seed: u64,
    ) -> Result<DecisionResult, MonteCarloError> {
        let mc = self.mc_engine.run(assets, environment, params, seed)?;

        let (verdict, reasoning) = classify(
            mc.failure_probability,
            mc.mean_sf,
            mc.ucl_95,
            safety_factor_target,
        );
        info!(verdict = verdict.as_str(), pf = mc.failure_probability, mean_sf = mc.mean_sf, "decision rendered");

        Ok(DecisionResult {
            verdict,
            failure_probability: mc.failure_probability,
            mean_safety_factor: mc.mean_sf,
            safety_factor_target,
            ucl_95: mc.ucl_95,
            monte_carlo_n: self.mc_engine.n_samples(),
            details: SafetyFactorDetails {
                std_sf: mc.std_sf,
                min_sf: mc.min_sf,
                max_sf: mc.max_sf,
                percentile_5: mc.percentile_5,
                percentile_95: mc.percentile_95,
            },
            reasoning,
        })
    }

    /// Convenience wrapper using the standard target and seed.
    pub fn decide_default(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
    ) -> Result<DecisionResult, MonteCarloError> {
        self.decide(
            assets,
            environment,
            PASS_SAFETY_FACTOR_TARGET,
            None,
            DEFAULT_DECISION_SEED,
        )
    }
}

/// Pure classification of Monte Carlo statistics.
///
/// Separated from the batch runner so the threshold boundaries can be tested
/// without sampling.
fn classify(pf: f64, mean_sf: f64, ucl_95: f64, target: f64) -> (Verdict, String) {
    if pf >= FAIL_PROBABILITY_THRESHOLD || mean_sf < FAIL_SAFETY_FACTOR_THRESHOLD {
        let reasoning = format!(
            "FAIL: Failure probability {:.1}% (threshold: {:.0}%), Mean SF = {:.2} (minimum: {:.1})",
            pf * 100.0,
            FAIL_PROBABILITY_THRESHOLD * 100.0,
            mean_sf,
            FAIL_SAFETY_FACTOR_THRESHOLD,
        );
        (Verdict::Fail, reasoning)
    } else if mean_sf < target || ucl_95 > target * 1.5 {
        let reasoning = format!(
            "WARNING: Mean SF = {:.2} is below target {:.1}, or 95% UCL = {:.2} indicates tail risk. Conditional risk detected.",
            mean_sf, target, ucl_95,
        );
        (Verdict::Warning, reasoning)
    } else {
        let reasoning = format!(
            "PASS: Mean SF = {:.2} >= target {:.1}, Failure probability = {:.1}% < {:.0}%. All scenarios within safety limits.",
            mean_sf,
            target,
            pf * 100.0,
            FAIL_PROBABILITY_THRESHOLD * 100.0,
        );
        (Verdict::Pass, reasoning)
    }
}
