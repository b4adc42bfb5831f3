//! Physical constants and KDS (Korean Design Standards) thresholds.
//!
//! Units follow SI unless noted. The KDS values come from KDS 24 10 10
//! (road design standards) and are treated as fixed policy inputs.

// ===== Physical constants =====

/// Gravitational acceleration (m/s^2).
pub const GRAVITY: f64 = 9.81;
/// Air density at 15 °C, sea level (kg/m^3).
pub const AIR_DENSITY: f64 = 1.225;
/// Density of a 23% NaCl brine solution (kg/m^3).
pub const BRINE_DENSITY_23PCT: f64 = 1170.0;

/// Eutectic point of the NaCl-water system (°C).
pub const NACL_EUTECTIC_TEMP: f64 = -21.1;
/// Eutectic concentration of NaCl brine (% by weight).
pub const NACL_EUTECTIC_CONC: f64 = 23.3;

/// Stefan-Boltzmann constant (W/(m^2·K^4)).
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// Drag coefficient for small spherical droplets.
pub const DROPLET_DRAG_COEFF: f64 = 0.44;

// ===== KDS thresholds =====

/// Default minimum safety factor for a passing design.
pub const KDS_MIN_SAFETY_FACTOR: f64 = 1.5;
/// Minimum effective brine coverage ratio (85%).
pub const KDS_MIN_BRINE_COVERAGE: f64 = 0.85;

/// Freezing point of pure water (°C).
pub const FREEZING_POINT_WATER: f64 = 0.0;
/// Surface temperature below which an icing warning is raised (°C).
pub const ICE_WARNING_TEMP: f64 = 3.0;

// ===== Decision thresholds =====

/// Default Monte Carlo sample count.
pub const MONTE_CARLO_N: usize = 1000;
/// Failure probability at or above which the verdict is FAIL.
pub const FAIL_PROBABILITY_THRESHOLD: f64 = 0.20;
/// Mean safety factor below which the verdict is FAIL.
pub const FAIL_SAFETY_FACTOR_THRESHOLD: f64 = 1.0;
/// Mean safety factor target for a PASS verdict.
pub const PASS_SAFETY_FACTOR_TARGET: f64 = 1.5;
/// Default seed for reproducible decision runs.
pub const DEFAULT_DECISION_SEED: u64 = 42;

// ===== Calibration thresholds =====

/// Drift percentage above which recalibration is considered.
pub const DRIFT_THRESHOLD_PCT: f64 = 5.0;
/// Consecutive over-threshold observations required to trigger recalibration.
pub const DRIFT_SUSTAINED_MINUTES: usize = 10;
/// Rolling window of retained drift observations per asset.
pub const DRIFT_HISTORY_CAPACITY: usize = 100;
/// Default proportional-feedback learning rate.
pub const CALIBRATION_LEARNING_RATE: f64 = 0.1;

// ===== Spray system defaults =====
// Substituted when an asset's property bag omits the key.

pub const DEFAULT_NOZZLE_DIAMETER: f64 = 0.003; // m
pub const DEFAULT_SPRAY_ANGLE: f64 = 60.0; // degrees
pub const DEFAULT_FLOW_RATE: f64 = 0.5; // L/min
pub const DEFAULT_PUMP_PRESSURE: f64 = 300_000.0; // Pa (3 bar)
pub const DEFAULT_BRINE_CONCENTRATION: f64 = 23.0; // %
pub const DEFAULT_MOUNTING_HEIGHT: f64 = 0.3; // m
/// Nozzle velocity coefficient (Cv) in the Bernoulli exit-velocity relation.
pub const SPRAY_VELOCITY_COEFF: f64 = 0.95;

/// Road segment defaults for absent properties.
pub const DEFAULT_ROAD_LENGTH: f64 = 10.0; // m
pub const DEFAULT_ROAD_WIDTH: f64 = 7.0; // m
