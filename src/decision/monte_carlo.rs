//! Monte Carlo uncertainty propagation.
//!
//! Samples perturbed environments around a base condition, runs the chosen
//! physics engine once per sample, and aggregates the safety-factor
//! distribution. One seeded generator drives all perturbations so a given
//! (seed, inputs) pair reproduces bit-identical statistics.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::constants::MONTE_CARLO_N;
use crate::domain::{EnvironmentCondition, PhysicsAsset, PhysicsParams};
use crate::physics::PhysicsEngine;

/// Perturbation widths for each sampled environment field.
const SIGMA_TEMPERATURE: f64 = 2.0;
const SIGMA_HUMIDITY: f64 = 10.0;
const SIGMA_WIND_SPEED: f64 = 1.5;
const SIGMA_WIND_DIRECTION: f64 = 15.0;
const SIGMA_PRECIPITATION: f64 = 0.5;
const SIGMA_SOLAR_RADIATION: f64 = 50.0;

#[derive(Error, Debug)]
pub enum MonteCarloError {
    #[error("monte carlo batch exceeded its {budget:?} wall-clock budget after {completed} samples")]
    BudgetExceeded { budget: Duration, completed: usize },
}

/// Aggregated safety-factor distribution for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub safety_factors: Vec<f64>,
    pub mean_sf: f64,
    pub std_sf: f64,
    pub failure_probability: f64,
    pub ucl_95: f64,
    pub n_samples: usize,
    pub min_sf: f64,
    pub max_sf: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
}

/// Monte Carlo risk-assessment engine wrapping one physics engine.
pub struct MonteCarloEngine {
    engine: Box<dyn PhysicsEngine>,
    n_samples: usize,
    /// Optional wall-clock limit for a batch. When exceeded the run aborts
    /// with an error instead of returning a short sample array.
    time_budget: Option<Duration>,
}

impl MonteCarloEngine {
    pub fn new(engine: Box<dyn PhysicsEngine>, n_samples: usize) -> Self {
        Self {
            engine,
            n_samples,
            time_budget: None,
        }
    }

    pub fn with_default_samples(engine: Box<dyn PhysicsEngine>) -> Self {
        Self::new(engine, MONTE_CARLO_N)
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Draws one perturbed environment.
    ///
    /// The draw order (temperature, humidity, wind speed, wind direction,
    /// precipitation, solar radiation) is part of the reproducibility
    /// contract; reordering changes every downstream statistic. The measured
    /// road surface temperature is carried through unperturbed.
    fn sample_environment(
        base: &EnvironmentCondition,
        rng: &mut ChaCha8Rng,
    ) -> EnvironmentCondition {
        fn gauss(rng: &mut ChaCha8Rng, mean: f64, sigma: f64) -> f64 {
            let z: f64 = StandardNormal.sample(rng);
            mean + sigma * z
        }

        EnvironmentCondition {
            temperature: gauss(rng, base.temperature, SIGMA_TEMPERATURE),
            humidity: gauss(rng, base.humidity, SIGMA_HUMIDITY).clamp(0.0, 100.0),
            wind_speed: gauss(rng, base.wind_speed, SIGMA_WIND_SPEED).max(0.0),
            wind_direction: gauss(rng, base.wind_direction, SIGMA_WIND_DIRECTION).rem_euclid(360.0),
            precipitation: gauss(rng, base.precipitation, SIGMA_PRECIPITATION).max(0.0),
            solar_radiation: gauss(rng, base.solar_radiation, SIGMA_SOLAR_RADIATION).max(0.0),
            road_surface_temp: base.road_surface_temp,
        }
    }

    /// Runs the batch and aggregates the safety-factor distribution.
    ///
    /// A physics failure in a single sample records that sample as a failure
    /// (SF 0.0) and the batch continues.
    pub fn run(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
        params: Option<&PhysicsParams>,
        seed: u64,
    ) -> Result<MonteCarloSummary, MonteCarloError> {
        debug!(n_samples = self.n_samples, seed, "starting monte carlo batch");
        let started = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut safety_factors = Vec::with_capacity(self.n_samples);
        for completed in 0..self.n_samples {
            if let Some(budget) = self.time_budget {
                if started.elapsed() >= budget {
                    return Err(MonteCarloError::BudgetExceeded { budget, completed });
                }
            }

            let sampled = Self::sample_environment(environment, &mut rng);
            let sf = match self.engine.predict(assets, &sampled, params) {
                Ok(prediction) => self.engine.safety_factor(&prediction, &sampled),
                Err(err) => {
                    debug!(sample = completed, error = %err, "sample failed, recording SF 0.0");
                    0.0
                }
            };
            safety_factors.push(sf);
        }

        Ok(summarize(safety_factors))
    }
}

fn summarize(safety_factors: Vec<f64>) -> MonteCarloSummary {
    let n = safety_factors.len();
    let n_f = n as f64;

    let mean_sf = safety_factors.iter().sum::<f64>() / n_f;
    let variance = safety_factors.iter().map(|sf| (sf - mean_sf).powi(2)).sum::<f64>() / n_f;
    let std_sf = variance.sqrt();

    let failures = safety_factors.iter().filter(|&&sf| sf < 1.0).count();
    let failure_probability = failures as f64 / n_f;

    let mut sorted = safety_factors.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    MonteCarloSummary {
        mean_sf,
        std_sf,
        failure_probability,
        ucl_95: mean_sf + 1.96 * std_sf,
        n_samples: n,
        min_sf: sorted.first().copied().unwrap_or(f64::NAN),
        max_sf: sorted.last().copied().unwrap_or(f64::NAN),
        percentile_5: percentile(&sorted, 5.0),
        percentile_95: percentile(&sorted, 95.0),
        safety_factors,
    }
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let weight = rank - lo as f64;
    sorted[lo] * (1.0 - weight) + sorted[hi] * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetType;
    use crate::physics::GridCoverageEngine;
    use serde_json::json;

    fn assets() -> Vec<PhysicsAsset> {
        let mut road = PhysicsAsset::new("road-001", AssetType::RoadSegment);
        road.properties.insert("length".into(), json!(100.0));
        road.properties.insert("width".into(), json!(7.0));
        let mut dev = PhysicsAsset::new("spray-001", AssetType::SprayDevice);
        dev.properties.insert("pump_pressure".into(), json!(300000.0));
        vec![road, dev]
    }

    fn env() -> EnvironmentCondition {
        EnvironmentCondition {
            temperature: -5.0,
            humidity: 70.0,
            wind_speed: 4.0,
            wind_direction: 270.0,
            precipitation: 2.0,
            solar_radiation: 100.0,
            road_surface_temp: None,
        }
    }

    fn mc(n: usize) -> MonteCarloEngine {
        MonteCarloEngine::new(Box::new(GridCoverageEngine::new(1.0)), n)
    }

    #[test]
    fn batch_returns_exactly_n_safety_factors() {
        for n in [1, 7, 50] {
            let summary = mc(n).run(&assets(), &env(), None, 42).unwrap();
            assert_eq!(summary.safety_factors.len(), n);
            assert_eq!(summary.n_samples, n);
        }
    }

    #[test]
    fn identical_seed_reproduces_identical_statistics() {
        let engine = mc(20);
        let a = engine.run(&assets(), &env(), None, 42).unwrap();
        let b = engine.run(&assets(), &env(), None, 42).unwrap();
        assert_eq!(a.mean_sf, b.mean_sf);
        assert_eq!(a.std_sf, b.std_sf);
        assert_eq!(a.failure_probability, b.failure_probability);
        assert_eq!(a.safety_factors, b.safety_factors);
    }

    #[test]
    fn different_seeds_perturb_the_distribution() {
        let engine = mc(20);
        let a = engine.run(&assets(), &env(), None, 1).unwrap();
        let b = engine.run(&assets(), &env(), None, 2).unwrap();
        assert_ne!(a.safety_factors, b.safety_factors);
    }

    #[test]
    fn failure_probability_stays_in_unit_interval() {
        let summary = mc(50).run(&assets(), &env(), None, 42).unwrap();
        assert!(summary.failure_probability >= 0.0);
        assert!(summary.failure_probability <= 1.0);
        assert!(summary.ucl_95 >= summary.mean_sf);
        assert!(summary.min_sf <= summary.max_sf);
    }

    #[test]
    fn sampled_humidity_and_wind_respect_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let base = EnvironmentCondition {
            humidity: 98.0,
            wind_speed: 0.2,
            precipitation: 0.1,
            ..Default::default()
        };
        for _ in 0..200 {
            let s = MonteCarloEngine::sample_environment(&base, &mut rng);
            assert!(s.humidity >= 0.0 && s.humidity <= 100.0);
            assert!(s.wind_speed >= 0.0);
            assert!(s.precipitation >= 0.0);
            assert!(s.solar_radiation >= 0.0);
            assert!(s.wind_direction >= 0.0 && s.wind_direction < 360.0);
        }
    }

    #[test]
    fn surface_temperature_is_not_perturbed() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let base = EnvironmentCondition {
            road_surface_temp: Some(-9.5),
            ..Default::default()
        };
        let s = MonteCarloEngine::sample_environment(&base, &mut rng);
        assert_eq!(s.road_surface_temp, Some(-9.5));
    }

    #[test]
    fn percentiles_interpolate_linearly() {
        let sorted = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&sorted, 50.0) - 2.0).abs() < 1e-12);
        assert!((percentile(&sorted, 25.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&sorted, 5.0) - 0.2).abs() < 1e-12);
        assert!((percentile(&sorted, 95.0) - 3.8).abs() < 1e-12);
    }

    #[test]
    fn zero_time_budget_aborts_the_batch() {
        let engine = mc(10).with_time_budget(Duration::ZERO);
        let result = engine.run(&assets(), &env(), None, 42);
        assert!(matches!(result, Err(MonteCarloError::BudgetExceeded { .. })));
    }
}
