//! Failure-first rule engine.
//!
//! Deterministic checklist over a concrete coverage simulation: every
//! plausible failure mode is enumerated before the overall verdict is
//! rendered, and each observation carries its evidence so the judgment is
//! auditable.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::project::SimulationProject;
use crate::site::EnvironmentContext;
use crate::spraysim::SimulationResult;

/// Coverage ratio below which the design only conditionally passes.
const MIN_COVERAGE_RATIO: f64 = 0.80;
/// Coverage ratio below which the design fails outright.
const CRITICAL_COVERAGE_RATIO: f64 = 0.50;
/// Longest tolerable contiguous uncovered stretch (m).
const MAX_UNCOVERED_GAP_M: f64 = 10.0;
/// Minimum clearance between a buried device and any utility (mm).
const MIN_UTILITY_CLEARANCE_MM: f64 = 300.0;
/// Lateral drift beyond this fraction of the spray range draws a warning.
const MAX_DRIFT_FRACTION: f64 = 0.3;
/// Slope magnitude (%) above which brine runoff skews the pattern.
const MAX_EFFECTIVE_SLOPE_PCT: f64 = 5.0;
/// Minimum tank runtime (hours) before a capacity warning.
const MIN_TANK_RUNTIME_H: f64 = 2.0;

/// Regional frost-depth limits (mm), matched by substring against the
/// location name.
const FROST_DEPTH_LIMITS: &[(&str, f64)] = &[
    ("seoul", 600.0),
    ("gangwon", 900.0),
    ("busan", 300.0),
    ("daejeon", 500.0),
];
const DEFAULT_FROST_DEPTH_MM: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleVerdict {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "CONDITIONAL_PASS")]
    ConditionalPass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Immediate failure.
    Critical,
    /// Conditional pass possible.
    Warning,
    /// Informational only.
    Info,
}

/// One observed failure or risk factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureObservation {
    pub rule_id: String,
    pub category: String,
    pub severity: Severity,
    pub description: String,
    pub evidence: String,
    #[serde(default)]
    pub recommendation: String,
}

/// The rule engine's structured judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    pub verdict: RuleVerdict,
    /// Fixed per-branch confidence in [0, 1].
    pub confidence: f64,
    pub summary: String,
    pub failures: Vec<FailureObservation>,
    /// Conditions to satisfy, populated under CONDITIONAL_PASS.
    pub conditions: Vec<String>,
    pub limitations: Vec<String>,
}

/// Runs the failure-first evaluation: every rule is checked before the
/// verdict is composed.
pub fn evaluate(
    project: &SimulationProject,
    env: &EnvironmentContext,
    sim_result: &SimulationResult,
) -> JudgmentResult {
    let mut failures = Vec::new();
    failures.extend(check_coverage(sim_result));
    failures.extend(check_uncovered_gaps(sim_result));
    failures.extend(check_wind_drift(sim_result, env));
    failures.extend(check_frost_risk(project, env));
    failures.extend(check_utility_conflict(project));
    failures.extend(check_supply_capacity(project, sim_result));
    failures.extend(check_slope_effectiveness(project));

    let judgment = make_verdict(failures);
    info!(verdict = ?judgment.verdict, failures = judgment.failures.len(), "rule judgment rendered");
    judgment
}

fn check_coverage(sim: &SimulationResult) -> Vec<FailureObservation> {
    let mut obs = Vec::new();
    if sim.coverage_ratio < CRITICAL_COVERAGE_RATIO {
        obs.push(FailureObservation {
            rule_id: "COV-001".into(),
            category: "coverage".into(),
            severity: Severity::Critical,
            description: "Spray coverage is severely deficient.".into(),
            evidence: format!(
                "Coverage ratio: {:.1}% (required: {:.0}% or more)",
                sim.coverage_ratio * 100.0,
                MIN_COVERAGE_RATIO * 100.0
            ),
            recommendation: "Add devices or reduce the spacing between them.".into(),
        });
    } else if sim.coverage_ratio < MIN_COVERAGE_RATIO {
        obs.push(FailureObservation {
            rule_id: "COV-002".into(),
            category: "coverage".into(),
            severity: Severity::Warning,
            description: "Spray coverage falls short of the standard.".into(),
            evidence: format!(
                "Coverage ratio: {:.1}% (required: {:.0}% or more)",
                sim.coverage_ratio * 100.0,
                MIN_COVERAGE_RATIO * 100.0
            ),
            recommendation: "Reposition devices or widen the spray angle.".into(),
        });
    }
    obs
}

fn check_uncovered_gaps(sim: &SimulationResult) -> Vec<FailureObservation> {
    let mut obs = Vec::new();
    for &(start, end) in &sim.uncovered_zones {
        let gap = end - start;
        if gap > MAX_UNCOVERED_GAP_M {
            obs.push(FailureObservation {
                rule_id: "GAP-001".into(),
                category: "uncovered_gap".into(),
                severity: Severity::Critical,
                description: format!("A contiguous uncovered stretch of {gap:.1} m exceeds the allowable limit."),
                evidence: format!(
                    "Interval: {start:.1} m to {end:.1} m (limit: {MAX_UNCOVERED_GAP_M} m)"
                ),
                recommendation: "Install an additional device within this interval.".into(),
            });
        } else if gap > MAX_UNCOVERED_GAP_M * 0.7 {
            obs.push(FailureObservation {
                rule_id: "GAP-002".into(),
                category: "uncovered_gap".into(),
                severity: Severity::Warning,
                description: format!("A contiguous uncovered stretch of {gap:.1} m needs attention."),
                evidence: format!("Interval: {start:.1} m to {end:.1} m"),
                recommendation: "Re-examine the device spacing.".into(),
            });
        }
    }
    obs
}

fn check_wind_drift(sim: &SimulationResult, env: &EnvironmentContext) -> Vec<FailureObservation> {
    let mut obs = Vec::new();
    for dr in &sim.device_results {
        if dr.drift_offset_m.abs() > dr.effective_range_m * MAX_DRIFT_FRACTION {
            obs.push(FailureObservation {
                rule_id: "WIND-001".into(),
                category: "wind_drift".into(),
                severity: Severity::Warning,
                description: format!(
                    "Device {} is strongly deflected by wind.",
                    dr.device_id
                ),
                evidence: format!(
                    "Drift: {:.2} m (wind speed: {} m/s)",
                    dr.drift_offset_m, env.climate.wind_speed_ms
                ),
                recommendation: "Consider a wind shield or a reoriented nozzle.".into(),
            });
        }
    }
    obs
}

/// Regional frost depth by substring match on the location name.
fn frost_depth_for(location_name: &str) -> (&'static str, f64) {
    let loc = location_name.to_lowercase();
    for &(key, depth) in FROST_DEPTH_LIMITS {
        if loc.contains(key) {
            return (key, depth);
        }
    }
    ("default", DEFAULT_FROST_DEPTH_MM)
}

fn check_frost_risk(project: &SimulationProject, env: &EnvironmentContext) -> Vec<FailureObservation> {
    let mut obs = Vec::new();
    let (region, frost_depth) = frost_depth_for(&env.location_name);

    for device in &project.spray_devices {
        if device.burial_depth_mm > 0.0 && device.burial_depth_mm < frost_depth {
            obs.push(FailureObservation {
                rule_id: "FROST-001".into(),
                category: "frost_risk".into(),
                severity: Severity::Critical,
                description: format!(
                    "Device {} is buried above the regional frost depth.",
                    device.device_id
                ),
                evidence: format!(
                    "Burial: {} mm, frost depth: {} mm ({})",
                    device.burial_depth_mm, frost_depth, region
                ),
                recommendation: format!(
                    "Bury the device at {frost_depth} mm or deeper, or add trace heating."
                ),
            });
        }
    }

    if let Some(supply) = &project.supply_system {
        if supply.pipe_burial_depth_mm < frost_depth && !supply.has_heating {
            obs.push(FailureObservation {
                rule_id: "FROST-002".into(),
                category: "frost_risk".into(),
                severity: Severity::Critical,
                description: "Supply piping is above the frost depth with no heating.".into(),
                evidence: format!(
                    "Pipe burial: {} mm, frost depth: {} mm",
                    supply.pipe_burial_depth_mm, frost_depth
                ),
                recommendation: "Add pipe heating or insulation, or bury the piping deeper.".into(),
            });
        }
    }
    obs
}

fn check_utility_conflict(project: &SimulationProject) -> Vec<FailureObservation> {
    let mut obs = Vec::new();
    for device in &project.spray_devices {
        if device.burial_depth_mm == 0.0 {
            continue;
        }
        for util in &project.underground_utilities {
            let cross_dist_mm = (device.position_cross_m - util.position_cross_m).abs() * 1000.0;
            let depth_dist_mm = (device.burial_depth_mm - util.depth_mm).abs();
            let clearance = cross_dist_mm.min(depth_dist_mm);

            if clearance < MIN_UTILITY_CLEARANCE_MM {
                obs.push(FailureObservation {
                    rule_id: "UTIL-001".into(),
                    category: "utility_clearance".into(),
                    severity: Severity::Critical,
                    description: format!(
                        "Device {} conflicts with a buried {} line.",
                        device.device_id, util.utility_type
                    ),
                    evidence: format!(
                        "Clearance: {clearance:.0} mm (minimum: {MIN_UTILITY_CLEARANCE_MM} mm)"
                    ),
                    recommendation: "Relocate the device or reroute the utility.".into(),
                });
            }
        }
    }
    obs
}

fn check_supply_capacity(
    project: &SimulationProject,
    sim: &SimulationResult,
) -> Vec<FailureObservation> {
    let Some(supply) = &project.supply_system else {
        return vec![FailureObservation {
            rule_id: "SUP-001".into(),
            category: "supply_system".into(),
            severity: Severity::Warning,
            description: "No supply system is defined.".into(),
            evidence: "Tank capacity and pump pressure cannot be verified.".into(),
            recommendation: "Provide the supply system specification.".into(),
        }];
    };

    let mut obs = Vec::new();
    let consumption_lph = sim.total_brine_consumption_lph;
    if consumption_lph > 0.0 {
        let runtime_hours = supply.tank_capacity_l / consumption_lph;
        if runtime_hours < MIN_TANK_RUNTIME_H {
            obs.push(FailureObservation {
                rule_id: "SUP-002".into(),
                category: "supply_system".into(),
                severity: Severity::Warning,
                description: format!(
                    "Tank runtime of {runtime_hours:.1} h is short for the configured consumption."
                ),
                evidence: format!(
                    "Tank: {} L, consumption: {consumption_lph:.0} L/h",
                    supply.tank_capacity_l
                ),
                recommendation: "Increase tank capacity or add automatic refill.".into(),
            });
        }
    }
    obs
}

fn check_slope_effectiveness(project: &SimulationProject) -> Vec<FailureObservation> {
    let mut obs = Vec::new();
    for road in &project.road_segments {
        if road.slope_percent.abs() > MAX_EFFECTIVE_SLOPE_PCT {
            obs.push(FailureObservation {
                rule_id: "SLOPE-001".into(),
                category: "slope".into(),
                severity: Severity::Warning,
                description: format!(
                    "Brine runoff bias is expected on a {}% grade.",
                    road.slope_percent
                ),
                evidence: format!(
                    "Segment {}: slope {}%",
                    road.segment_id, road.slope_percent
                ),
                recommendation: "Consider an extra spray point on the downhill side.".into(),
            });
        }
    }
    obs
}

fn limitations(extended: bool) -> Vec<String> {
    let mut notes = vec![
        "This judgment is based on the rule-level coverage simulation.".to_string(),
        "No full physical spray or thermal simulation was performed.".to_string(),
        "Results may differ under actual site conditions.".to_string(),
    ];
    if extended {
        notes.push("Extreme climate events require a separate simulation study.".to_string());
    }
    notes
}

fn make_verdict(failures: Vec<FailureObservation>) -> JudgmentResult {
    let critical_count = failures.iter().filter(|f| f.severity == Severity::Critical).count();
    let warnings: Vec<&FailureObservation> =
        failures.iter().filter(|f| f.severity == Severity::Warning).collect();

    if critical_count > 0 {
        JudgmentResult {
            verdict: RuleVerdict::Fail,
            confidence: 0.9,
            summary: format!(
                "{critical_count} critical issue(s) found. The current design is likely to fail under real conditions."
            ),
            conditions: Vec::new(),
            limitations: limitations(false),
            failures,
        }
    } else if !warnings.is_empty() {
        let conditions: Vec<String> = warnings
            .iter()
            .filter(|w| !w.recommendation.is_empty())
            .map(|w| w.recommendation.clone())
            .collect();
        JudgmentResult {
            verdict: RuleVerdict::ConditionalPass,
            confidence: 0.7,
            summary: format!(
                "{} item(s) need attention. The installation can operate once the listed conditions are met.",
                warnings.len()
            ),
            conditions,
            limitations: limitations(false),
            failures,
        }
    } else {
        JudgmentResult {
            verdict: RuleVerdict::Pass,
            confidence: 0.8,
            summary: "The current design operates effectively under the simulated environment.".into(),
            conditions: Vec::new(),
            limitations: limitations(true),
            failures,
        }
    }
}
