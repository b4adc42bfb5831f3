//! Concrete spray-coverage simulation.
//!
//! Deterministic footprint model over a 1 m grid: per-device effective range
//! (temperature-derated), wind-drift offset, distance-decayed brine
//! deposition, and union coverage across devices with uncovered-zone
//! detection. This is the simulation the failure-first rule engine inspects.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::project::{BrineSprayDevice, RoadSegment, SimulationProject, SprayPattern};
use crate::site::{estimate_spray_drift, EnvironmentContext};

/// Minimum brine deposition for a cell to count as covered (g/m^2).
const MIN_EFFECTIVE_BRINE_GM2: f64 = 8.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpraySimError {
    #[error("simulation requires at least one road segment")]
    NoRoadSegments,
    #[error("simulation requires at least one spray device")]
    NoSprayDevices,
}

/// One grid cell of the road surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageCell {
    /// Position along the road (m).
    pub x: f64,
    /// Lateral position from the centerline (m).
    pub y: f64,
    pub brine_amount_gm2: f64,
    pub is_covered: bool,
}

/// Simulation output for a single device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSimResult {
    pub device_id: String,
    pub effective_range_m: f64,
    pub drift_offset_m: f64,
    pub coverage_area_m2: f64,
    pub brine_consumption_lpm: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub coverage_cells: Vec<CoverageCell>,
}

/// Whole-project simulation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_road_area_m2: f64,
    pub covered_area_m2: f64,
    pub coverage_ratio: f64,
    /// Contiguous uncovered longitudinal intervals (start m, end m).
    pub uncovered_zones: Vec<(f64, f64)>,
    pub device_results: Vec<DeviceSimResult>,
    pub overlap_area_m2: f64,
    pub total_brine_consumption_lph: f64,
}

/// Float grid walk mirroring the deposition model's sampling.
fn frange(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> {
    (0..)
        .map(move |i| {
            let v = start + i as f64 * step;
            (v * 1e4).round() / 1e4
        })
        .take_while(move |&v| v < stop)
}

/// Temperature derating of the spray range: colder brine atomizes worse.
fn temperature_efficiency(air_temp_c: f64) -> f64 {
    if air_temp_c < -10.0 {
        0.7
    } else if air_temp_c < -5.0 {
        0.85
    } else if air_temp_c < 0.0 {
        0.95
    } else {
        1.0
    }
}

/// Simulates one device's footprint on the road grid.
pub fn calculate_spray_coverage(
    device: &BrineSprayDevice,
    road: &RoadSegment,
    env: &EnvironmentContext,
    resolution_m: f64,
) -> DeviceSimResult {
    let drift = estimate_spray_drift(env.climate.wind_speed_ms, device.spray_range_m);
    // Only the cross-road component of the wind displaces the footprint.
    let wind_cross_component = env.climate.wind_direction_deg.to_radians().sin();
    let drift_offset = drift * wind_cross_component;

    let effective_range = device.spray_range_m * temperature_efficiency(env.climate.air_temperature_c);

    let half_road = road.width_m * road.lanes as f64 / 2.0;
    let spray_width = match device.spray_pattern {
        SprayPattern::Linear => 0.5,
        SprayPattern::Fan => {
            effective_range * (device.spray_angle_deg / 2.0).to_radians().tan()
        }
        SprayPattern::FullCircle => effective_range,
    };

    let device_x = device.position_along_road_m;
    let device_y = device.position_cross_m + drift_offset;

    // Sample on the road-aligned grid so device cells and road cells share
    // positions; a private per-device grid would never line up for union and
    // gap analysis.
    let mut cells = Vec::new();
    for x in frange(0.0, road.length_m, resolution_m) {
        if (x - device_x).abs() > effective_range {
            continue;
        }
        for y in frange(-half_road, half_road, resolution_m) {
            if (y - device_y).abs() > spray_width {
                continue;
            }
            let dist = ((x - device_x).powi(2) + (y - device_y).powi(2)).sqrt();
            if dist > effective_range || dist < 0.1 {
                continue;
            }

            // Deposition decays with distance from the nozzle.
            let intensity = 1.0 - dist / effective_range;
            let brine_amount =
                (intensity * device.flow_rate_lpm * 10.0 / dist.powf(1.2).max(1.0)).max(0.0);
            cells.push(CoverageCell {
                x,
                y,
                brine_amount_gm2: brine_amount,
                is_covered: brine_amount >= MIN_EFFECTIVE_BRINE_GM2,
            });
        }
    }

    let covered = cells.iter().filter(|c| c.is_covered).count();
    DeviceSimResult {
        device_id: device.device_id.clone(),
        effective_range_m: effective_range,
        drift_offset_m: drift_offset,
        coverage_area_m2: covered as f64 * resolution_m * resolution_m,
        brine_consumption_lpm: device.flow_rate_lpm,
        coverage_cells: cells,
    }
}

/// Runs the full-project coverage simulation.
///
/// Fails fast on structurally unusable projects (no roads / no devices);
/// every other input produces a result.
pub fn run_full_simulation(
    project: &SimulationProject,
    env: &EnvironmentContext,
    resolution_m: f64,
) -> Result<SimulationResult, SpraySimError> {
    if project.road_segments.is_empty() {
        return Err(SpraySimError::NoRoadSegments);
    }
    if project.spray_devices.is_empty() {
        return Err(SpraySimError::NoSprayDevices);
    }

    // Single-segment model: the first segment carries the evaluation.
    let road = &project.road_segments[0];
    let total_road_area = road.length_m * road.width_m * road.lanes as f64;
    let half_road = road.width_m * road.lanes as f64 / 2.0;

    // Positions keyed in tenths of a meter; cells are road-grid aligned.
    let key = |x: f64, y: f64| -> (i64, i64) { ((x * 10.0).round() as i64, (y * 10.0).round() as i64) };

    let mut device_results = Vec::with_capacity(project.spray_devices.len());
    let mut covered_positions: HashSet<(i64, i64)> = HashSet::new();
    let mut overlap_count = 0usize;

    for device in &project.spray_devices {
        let result = calculate_spray_coverage(device, road, env, resolution_m);
        for cell in result.coverage_cells.iter().filter(|c| c.is_covered) {
            let pos = key(cell.x, cell.y);
            if !covered_positions.insert(pos) {
                overlap_count += 1;
            }
        }
        device_results.push(result);
    }

    let covered_area = covered_positions.len() as f64 * resolution_m * resolution_m;
    let coverage_ratio = if total_road_area > 0.0 {
        covered_area / total_road_area
    } else {
        0.0
    };

    // A longitudinal position counts as uncovered when no cell across the
    // road width reaches it.
    let covered_x: HashSet<i64> = covered_positions.iter().map(|&(x, _)| x).collect();
    let uncovered_x: Vec<i64> = frange(0.0, road.length_m, resolution_m)
        .map(|x| (x * 10.0).round() as i64)
        .filter(|x| !covered_x.contains(x))
        .collect();
    let uncovered_zones = find_uncovered_zones(&uncovered_x, resolution_m);

    let total_brine_consumption_lph =
        device_results.iter().map(|d| d.brine_consumption_lpm).sum::<f64>() * 60.0;
    debug!(
        coverage_ratio,
        uncovered_zones = uncovered_zones.len(),
        "coverage simulation complete"
    );

    Ok(SimulationResult {
        total_road_area_m2: total_road_area,
        covered_area_m2: covered_area,
        coverage_ratio,
        uncovered_zones,
        device_results,
        overlap_area_m2: overlap_count as f64 * resolution_m * resolution_m,
        total_brine_consumption_lph,
    })
}

/// Groups uncovered longitudinal positions into contiguous intervals.
///
/// `uncovered_x` holds positions in tenths of a meter.
fn find_uncovered_zones(uncovered_x: &[i64], resolution_m: f64) -> Vec<(f64, f64)> {
    if uncovered_x.is_empty() {
        return Vec::new();
    }

    let mut xs: Vec<i64> = uncovered_x.to_vec();
    xs.sort_unstable();
    xs.dedup();

    let gap_limit = resolution_m * 1.5;
    let mut zones = Vec::new();
    let mut zone_start = xs[0];
    let mut prev = xs[0];

    for &x in &xs[1..] {
        if (x - prev) as f64 / 10.0 > gap_limit {
            zones.push((zone_start as f64 / 10.0, prev as f64 / 10.0));
            zone_start = x;
        }
        prev = x;
    }
    zones.push((zone_start as f64 / 10.0, prev as f64 / 10.0));
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_env, test_project as base_project};

    fn test_project(n_devices: usize, road_length: f64) -> SimulationProject {
        base_project(n_devices, road_length, 700.0)
    }

    #[test]
    fn simulation_produces_bounded_coverage() {
        let project = test_project(5, 50.0);
        let result = run_full_simulation(&project, &test_env(), 1.0).unwrap();
        assert!(result.total_road_area_m2 > 0.0);
        assert!(result.coverage_ratio >= 0.0 && result.coverage_ratio <= 1.0);
        assert_eq!(result.device_results.len(), 5);
        assert!((result.total_brine_consumption_lph - 5.0 * 5.0 * 60.0).abs() < 1e-9);
    }

    #[test]
    fn empty_projects_fail_fast() {
        let mut project = test_project(5, 50.0);
        project.spray_devices.clear();
        assert_eq!(
            run_full_simulation(&project, &test_env(), 1.0),
            Err(SpraySimError::NoSprayDevices)
        );

        let mut project = test_project(5, 50.0);
        project.road_segments.clear();
        assert_eq!(
            run_full_simulation(&project, &test_env(), 1.0),
            Err(SpraySimError::NoRoadSegments)
        );
    }

    #[test]
    fn sparse_devices_leave_uncovered_zones() {
        let project = test_project(2, 200.0);
        let result = run_full_simulation(&project, &test_env(), 1.0).unwrap();
        assert!(!result.uncovered_zones.is_empty());
        let longest = result
            .uncovered_zones
            .iter()
            .map(|(s, e)| e - s)
            .fold(0.0, f64::max);
        assert!(longest > 10.0);
    }

    #[test]
    fn cold_air_derates_the_effective_range() {
        let project = test_project(1, 50.0);
        let device = &project.spray_devices[0];
        let road = &project.road_segments[0];

        let mut env = test_env();
        env.climate.air_temperature_c = -15.0;
        let cold = calculate_spray_coverage(device, road, &env, 1.0);
        assert!((cold.effective_range_m - 8.0 * 0.7).abs() < 1e-12);

        env.climate.air_temperature_c = 2.0;
        let warm = calculate_spray_coverage(device, road, &env, 1.0);
        assert_eq!(warm.effective_range_m, 8.0);
    }

    #[test]
    fn crosswind_displaces_the_footprint() {
        let project = test_project(1, 50.0);
        let device = &project.spray_devices[0];
        let road = &project.road_segments[0];

        let mut env = test_env();
        env.climate.wind_speed_ms = 6.0;
        env.climate.wind_direction_deg = 90.0;
        let result = calculate_spray_coverage(device, road, &env, 1.0);
        assert!(result.drift_offset_m > 0.0);
        assert!((result.drift_offset_m - estimate_spray_drift(6.0, 8.0)).abs() < 1e-9);
    }
}
