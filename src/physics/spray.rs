//! Spray-trajectory engine.
//!
//! Ballistic droplet transport from each spray device: nozzle exit velocity
//! from pump pressure (Bernoulli), then explicit Euler integration of each
//! droplet under gravity, quadratic aerodynamic drag, and wind advection.
//! Landing points are aggregated into a bounding-box coverage estimate.

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::domain::constants::{
    AIR_DENSITY, BRINE_DENSITY_23PCT, DROPLET_DRAG_COEFF, GRAVITY, KDS_MIN_BRINE_COVERAGE,
    SPRAY_VELOCITY_COEFF,
};
use crate::domain::{
    AssetType, EnvironmentCondition, PhysicsAsset, PhysicsParams, RoadSegmentParams,
    SprayDeviceParams,
};

use super::{CoveragePrediction, LandingPoint, PhysicsEngine, PhysicsError, Prediction};

/// Droplets simulated per device, spanning the spray cone.
const DROPLETS_PER_DEVICE: usize = 50;
/// Integration time step (s).
const TIME_STEP: f64 = 0.001;
/// Hard cap on simulated flight time (s).
const MAX_FLIGHT_TIME: f64 = 5.0;
/// Fixed launch elevation above the horizontal (degrees).
const LAUNCH_ELEVATION_DEG: f64 = 30.0;
/// Fraction of the landing bounding box assumed wetted.
///
/// Empirical fill factor, a calibration knob rather than a derived constant.
const BOUNDING_BOX_FILL: f64 = 0.7;

/// Trajectory-based spray coverage engine.
#[derive(Debug, Clone)]
pub struct SprayTrajectoryEngine {
    /// Seed for the droplet-diameter distribution. Each `predict` call derives
    /// a fresh generator from this seed, so predictions are repeatable.
    droplet_seed: u64,
}

impl Default for SprayTrajectoryEngine {
    fn default() -> Self {
        Self { droplet_seed: 42 }
    }
}

impl SprayTrajectoryEngine {
    pub fn new(droplet_seed: u64) -> Self {
        Self { droplet_seed }
    }

    /// Bernoulli nozzle exit velocity: v = Cv * sqrt(2 P / rho).
    fn exit_velocity(pressure: f64, density: f64) -> f64 {
        SPRAY_VELOCITY_COEFF * (2.0 * pressure / density).sqrt()
    }

    /// Integrates one droplet until ground contact or the time cap.
    ///
    /// Returns (distance along the spray axis, lateral drift) in meters.
    fn droplet_landing(
        v0: f64,
        elevation_rad: f64,
        height: f64,
        wind_speed: f64,
        wind_angle_rad: f64,
        diameter: f64,
    ) -> (f64, f64) {
        let mut vel = DVec3::new(v0 * elevation_rad.cos(), 0.0, v0 * elevation_rad.sin());
        let mut pos = DVec3::new(0.0, 0.0, height);

        let mass = (std::f64::consts::PI / 6.0) * diameter.powi(3) * BRINE_DENSITY_23PCT;
        let area = (std::f64::consts::PI / 4.0) * diameter.powi(2);
        let wind = DVec3::new(
            wind_speed * wind_angle_rad.cos(),
            wind_speed * wind_angle_rad.sin(),
            0.0,
        );

        let mut t = 0.0;
        while t < MAX_FLIGHT_TIME && pos.z > 0.0 {
            let rel = vel - wind;
            let rel_speed = rel.length();

            // F_drag = 0.5 rho Cd A |v_rel| v_rel, opposing relative motion.
            let mut accel = DVec3::new(0.0, 0.0, -GRAVITY);
            if rel_speed > 0.0 {
                let drag_accel = 0.5 * AIR_DENSITY * DROPLET_DRAG_COEFF * area * rel_speed / mass;
                accel -= drag_accel * rel;
            }

            vel += accel * TIME_STEP;
            pos += vel * TIME_STEP;
            t += TIME_STEP;
        }

        (pos.x, pos.y)
    }
}

impl PhysicsEngine for SprayTrajectoryEngine {
    fn predict(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
        params: Option<&PhysicsParams>,
    ) -> Result<Prediction, PhysicsError> {
        let spray_devices: Vec<&PhysicsAsset> = assets
            .iter()
            .filter(|a| a.asset_type == AssetType::SprayDevice)
            .collect();
        let road_segments: Vec<&PhysicsAsset> = assets
            .iter()
            .filter(|a| a.asset_type == AssetType::RoadSegment)
            .collect();

        if spray_devices.is_empty() {
            return Ok(Prediction::Coverage(CoveragePrediction {
                landing_points: Vec::new(),
                coverage_ratio: 0.0,
                total_coverage_area: 0.0,
                total_road_area: 0.0,
                spray_velocity: 0.0,
                wind_speed: environment.wind_speed,
                wind_direction: environment.wind_direction,
                grid: None,
            }));
        }

        let total_road_area: f64 = road_segments
            .iter()
            .map(|road| {
                let rp = RoadSegmentParams::from_asset(road);
                rp.length * rp.width
            })
            .sum();

        let wind_angle_rad = environment.wind_direction.to_radians();
        let elevation_rad = LAUNCH_ELEVATION_DEG.to_radians();
        let mut rng = ChaCha8Rng::seed_from_u64(self.droplet_seed);

        let mut landing_points = Vec::with_capacity(spray_devices.len() * DROPLETS_PER_DEVICE);
        let mut spray_velocity = 0.0;

        for device in &spray_devices {
            let dp = SprayDeviceParams::from_asset(device);
            if dp.pump_pressure <= 0.0 {
                return Err(PhysicsError::InvalidProperty {
                    asset_id: device.id.clone(),
                    property: "pump_pressure",
                    value: dp.pump_pressure,
                });
            }
            if dp.nozzle_diameter <= 0.0 {
                return Err(PhysicsError::InvalidProperty {
                    asset_id: device.id.clone(),
                    property: "nozzle_diameter",
                    value: dp.nozzle_diameter,
                });
            }

            spray_velocity = Self::exit_velocity(dp.pump_pressure, BRINE_DENSITY_23PCT);
            let half_angle = (dp.spray_angle / 2.0).to_radians();
            let orientation_rad = dp.orientation.to_radians();

            // Log-normal diameter distribution around 30% of the nozzle bore.
            let ln_mean = (dp.nozzle_diameter * 0.3).ln();
            let ln_sigma = 0.3;

            for i in 0..DROPLETS_PER_DEVICE {
                let z: f64 = StandardNormal.sample(&mut rng);
                let diameter = (ln_mean + ln_sigma * z).exp();

                let step = i as f64 / (DROPLETS_PER_DEVICE - 1).max(1) as f64;
                let angle_offset = -half_angle + 2.0 * half_angle * step;
                let spray_angle = orientation_rad + angle_offset;

                let (x, y) = Self::droplet_landing(
                    spray_velocity,
                    elevation_rad,
                    dp.mounting_height,
                    environment.wind_speed,
                    wind_angle_rad,
                    diameter,
                );
                let (sin_a, cos_a) = spray_angle.sin_cos();
                landing_points.push(LandingPoint {
                    x: x * cos_a - y * sin_a,
                    y: x * sin_a + y * cos_a,
                });
            }
        }

        let coverage_area = if landing_points.is_empty() {
            0.0
        } else {
            let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
            let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
            for p in &landing_points {
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
                min_y = min_y.min(p.y);
                max_y = max_y.max(p.y);
            }
            (max_x - min_x) * (max_y - min_y) * BOUNDING_BOX_FILL
        };

        let mut coverage_ratio = if total_road_area > 0.0 {
            (coverage_area / total_road_area).min(1.0)
        } else {
            0.0
        };

        if let Some(correction) = params.and_then(|p| p.get("coverage_correction")) {
            coverage_ratio = (coverage_ratio * (1.0 + correction)).clamp(0.0, 1.0);
        }

        if !coverage_ratio.is_finite() {
            return Err(PhysicsError::NonFinite {
                engine: "spray_trajectory",
                quantity: "coverage_ratio",
            });
        }

        Ok(Prediction::Coverage(CoveragePrediction {
            landing_points,
            coverage_ratio,
            total_coverage_area: coverage_area,
            total_road_area,
            spray_velocity,
            wind_speed: environment.wind_speed,
            wind_direction: environment.wind_direction,
            grid: None,
        }))
    }

    fn safety_factor(&self, prediction: &Prediction, _environment: &EnvironmentCondition) -> f64 {
        let coverage = match prediction {
            Prediction::Coverage(c) => c.coverage_ratio,
            Prediction::Thermal(_) => return 0.0,
        };
        let required = KDS_MIN_BRINE_COVERAGE;
        if required <= 0.0 {
            return f64::INFINITY;
        }
        coverage / required
    }
}
