//! Site environment layer.
//!
//! Location-driven context for the concrete coverage simulation: climate at a
//! point in time, season/time-of-day/traffic framing, and small rule-based
//! estimators for ice-formation risk and wind-induced spray drift.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Dawn,
    Morning,
    Afternoon,
    Evening,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    Low,
    Moderate,
    High,
    Congested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationType {
    None,
    Rain,
    Snow,
    Sleet,
    FreezingRain,
}

/// Climate at one moment at the site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateCondition {
    pub air_temperature_c: f64,
    pub road_surface_temperature_c: f64,
    pub humidity_percent: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub precipitation_type: PrecipitationType,
    pub precipitation_intensity_mmh: f64,
    pub solar_radiation_wm2: f64,
    pub cloud_cover_percent: f64,
}

/// Full simulation context for a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentContext {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub season: Season,
    pub time_of_day: TimeOfDay,
    pub climate: ClimateCondition,
    pub traffic_level: TrafficLevel,
    /// Shaded locations (e.g. under a bridge deck) cool faster.
    #[serde(default)]
    pub is_shaded: bool,
    #[serde(default = "default_true")]
    pub is_wind_exposed: bool,
}

fn default_true() -> bool {
    true
}

/// Site-table fallback when a caller names an unknown preset.
pub const DEFAULT_SITE_PRESET: &str = "gangwon_winter_night";

const fn climate(
    air: f64,
    surface: f64,
    humidity: f64,
    wind_speed: f64,
    wind_dir: f64,
    precip: PrecipitationType,
    precip_mmh: f64,
    solar: f64,
    cloud: f64,
) -> ClimateCondition {
    ClimateCondition {
        air_temperature_c: air,
        road_surface_temperature_c: surface,
        humidity_percent: humidity,
        wind_speed_ms: wind_speed,
        wind_direction_deg: wind_dir,
        precipitation_type: precip,
        precipitation_intensity_mmh: precip_mmh,
        solar_radiation_wm2: solar,
        cloud_cover_percent: cloud,
    }
}

/// Winter climate snapshots for major Korean cities.
pub static KOREA_CLIMATE_PRESETS: LazyLock<Vec<(&'static str, ClimateCondition)>> =
    LazyLock::new(|| {
        vec![
            (
                "seoul_winter_night",
                climate(-8.0, -10.0, 65.0, 3.5, 315.0, PrecipitationType::Snow, 2.0, 0.0, 90.0),
            ),
            (
                "seoul_winter_dawn",
                climate(-12.0, -15.0, 70.0, 1.5, 0.0, PrecipitationType::None, 0.0, 0.0, 30.0),
            ),
            (
                "gangwon_winter_night",
                climate(-15.0, -18.0, 75.0, 5.0, 270.0, PrecipitationType::Snow, 5.0, 0.0, 95.0),
            ),
            (
                "busan_winter_morning",
                climate(-2.0, -3.0, 80.0, 6.0, 180.0, PrecipitationType::FreezingRain, 1.5, 50.0, 80.0),
            ),
            (
                "daejeon_winter_dawn",
                climate(-6.0, -9.0, 60.0, 2.0, 0.0, PrecipitationType::None, 0.0, 0.0, 20.0),
            ),
        ]
    });

/// Looks up a site climate preset by key.
pub fn site_preset(name: &str) -> Option<ClimateCondition> {
    KOREA_CLIMATE_PRESETS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, c)| *c)
}

/// Site preset lookup with the documented fallback for unknown keys.
pub fn site_preset_or_default(name: &str) -> ClimateCondition {
    match site_preset(name) {
        Some(c) => c,
        None => {
            warn!(requested = name, fallback = DEFAULT_SITE_PRESET, "unknown site preset, using default");
            site_preset(DEFAULT_SITE_PRESET).unwrap_or_else(|| unreachable!())
        }
    }
}

/// Rule-based ice-formation risk in [0, 1].
pub fn estimate_ice_formation_risk(climate: &ClimateCondition) -> f64 {
    let mut risk: f64 = 0.0;

    // Sub-freezing pavement is the baseline hazard; colder is worse.
    if climate.road_surface_temperature_c <= 0.0 {
        risk += 0.4;
        risk += (climate.road_surface_temperature_c.abs() * 0.02).min(0.3);
    }

    if climate.humidity_percent > 70.0 {
        risk += 0.1;
    }

    match climate.precipitation_type {
        PrecipitationType::Snow | PrecipitationType::Sleet | PrecipitationType::FreezingRain => {
            risk += 0.2;
        }
        PrecipitationType::Rain if climate.road_surface_temperature_c <= 1.0 => {
            risk += 0.15;
        }
        _ => {}
    }

    // Calm, clear nights maximize radiative cooling.
    if climate.wind_speed_ms < 2.0 && climate.cloud_cover_percent < 30.0 {
        risk += 0.1;
    }

    risk.min(1.0)
}

/// Wind-induced lateral spray drift (m): 5% of the spray range per m/s of
/// wind. Linear in both arguments by construction.
pub fn estimate_spray_drift(wind_speed_ms: f64, spray_range_m: f64) -> f64 {
    const DRIFT_FACTOR: f64 = 0.05;
    wind_speed_ms * spray_range_m * DRIFT_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_dry_daytime_has_zero_risk() {
        let c = climate(5.0, 5.0, 50.0, 3.0, 0.0, PrecipitationType::None, 0.0, 200.0, 20.0);
        assert_eq!(estimate_ice_formation_risk(&c), 0.0);
    }

    #[test]
    fn gangwon_winter_night_is_high_risk() {
        let c = site_preset("gangwon_winter_night").unwrap();
        assert!(estimate_ice_formation_risk(&c) >= 0.8);
    }

    #[test]
    fn spray_drift_is_linear_in_wind_speed() {
        let low = estimate_spray_drift(1.0, 8.0);
        let high = estimate_spray_drift(5.0, 8.0);
        assert!(high > low);
        assert!((high - 5.0 * low).abs() < 1e-12);
    }

    #[test]
    fn site_presets_resolve_with_fallback() {
        assert!(site_preset("seoul_winter_dawn").is_some());
        assert!(site_preset("nowhere").is_none());
        let fallback = site_preset_or_default("nowhere");
        assert_eq!(fallback, site_preset(DEFAULT_SITE_PRESET).unwrap());
    }

    #[test]
    fn preset_values_match_the_published_table() {
        let c = site_preset("gangwon_winter_night").unwrap();
        assert_eq!(c.air_temperature_c, -15.0);
        assert_eq!(c.road_surface_temperature_c, -18.0);
        assert_eq!(c.humidity_percent, 75.0);
        assert_eq!(c.wind_speed_ms, 5.0);
        assert_eq!(c.precipitation_type, PrecipitationType::Snow);
    }
}
