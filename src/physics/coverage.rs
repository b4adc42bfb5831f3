//! Grid-coverage engine.
//!
//! Rasterizes the road footprint and marks cells reached by the trajectory
//! engine's landing points, giving a discretized coverage fraction instead of
//! the bounding-box estimate.

use crate::domain::constants::KDS_MIN_BRINE_COVERAGE;
use crate::domain::{
    AssetType, EnvironmentCondition, PhysicsAsset, PhysicsParams, RoadSegmentParams,
};

use super::{GridStats, PhysicsEngine, PhysicsError, Prediction, SprayTrajectoryEngine};

/// Radius around each landing point treated as wetted (m).
///
/// Calibration knob, like the grid resolution; neither is physically derived.
const SPLASH_RADIUS: f64 = 0.05;

/// Grid-based spray coverage engine.
#[derive(Debug, Clone)]
pub struct GridCoverageEngine {
    grid_resolution: f64,
    trajectory: SprayTrajectoryEngine,
}

impl Default for GridCoverageEngine {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl GridCoverageEngine {
    pub fn new(grid_resolution: f64) -> Self {
        Self {
            grid_resolution,
            trajectory: SprayTrajectoryEngine::default(),
        }
    }

    pub fn with_trajectory(grid_resolution: f64, trajectory: SprayTrajectoryEngine) -> Self {
        Self { grid_resolution, trajectory }
    }
}

impl PhysicsEngine for GridCoverageEngine {
    fn predict(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
        params: Option<&PhysicsParams>,
    ) -> Result<Prediction, PhysicsError> {
        let prediction = self.trajectory.predict(assets, environment, params)?;
        let mut coverage = match prediction {
            Prediction::Coverage(c) => c,
            thermal @ Prediction::Thermal(_) => return Ok(thermal),
        };

        let road_segments: Vec<RoadSegmentParams> = assets
            .iter()
            .filter(|a| a.asset_type == AssetType::RoadSegment)
            .map(RoadSegmentParams::from_asset)
            .collect();

        if road_segments.is_empty() {
            coverage.grid = Some(GridStats {
                grid_coverage: 0.0,
                grid_size: (0, 0),
                covered_cells: 0,
                total_cells: 0,
            });
            return Ok(Prediction::Coverage(coverage));
        }

        let total_length: f64 = road_segments.iter().map(|r| r.length).sum();
        let total_width = road_segments.iter().map(|r| r.width).fold(0.0, f64::max);

        let nx = ((total_length / self.grid_resolution) as usize).max(1);
        let ny = ((total_width / self.grid_resolution) as usize).max(1);
        let mut grid = vec![false; nx * ny];

        let splash_cells = ((SPLASH_RADIUS / self.grid_resolution) as i64).max(1);
        for pt in &coverage.landing_points {
            let ix = ((pt.x + total_length / 2.0) / self.grid_resolution) as i64;
            let iy = ((pt.y + total_width / 2.0) / self.grid_resolution) as i64;
            for dx in -splash_cells..=splash_cells {
                for dy in -splash_cells..=splash_cells {
                    let (gx, gy) = (ix + dx, iy + dy);
                    if gx >= 0 && (gx as usize) < nx && gy >= 0 && (gy as usize) < ny {
                        grid[gx as usize * ny + gy as usize] = true;
                    }
                }
            }
        }

        let covered_cells = grid.iter().filter(|&&c| c).count();
        let total_cells = nx * ny;
        let grid_coverage = if total_cells > 0 {
            covered_cells as f64 / total_cells as f64
        } else {
            0.0
        };

        coverage.coverage_ratio = grid_coverage;
        coverage.grid = Some(GridStats {
            grid_coverage,
            grid_size: (nx, ny),
            covered_cells,
            total_cells,
        });
        Ok(Prediction::Coverage(coverage))
    }

    fn safety_factor(&self, prediction: &Prediction, _environment: &EnvironmentCondition) -> f64 {
        let coverage = match prediction {
            Prediction::Coverage(c) => {
                c.grid.map(|g| g.grid_coverage).unwrap_or(c.coverage_ratio)
            }
            Prediction::Thermal(_) => return 0.0,
        };
        let required = KDS_MIN_BRINE_COVERAGE;
        if required <= 0.0 {
            return f64::INFINITY;
        }
        coverage / required
    }
}
