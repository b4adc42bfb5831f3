//! Korean regional climate presets.
//!
//! Predefined environmental conditions for major Korean corridors, used when
//! no live sensor feed is available. The registry is immutable after process
//! start and is consulted through pure lookup functions.

use std::sync::LazyLock;

use tracing::warn;

use crate::domain::{ClimatePreset, EnvironmentCondition};

/// Preset used when a caller asks for an unknown key.
pub const DEFAULT_PRESET: &str = "gangwon_winter_severe";

fn preset(
    name: &str,
    region: &str,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    precipitation: f64,
    solar_radiation: f64,
) -> ClimatePreset {
    ClimatePreset {
        name: name.to_string(),
        region: region.to_string(),
        conditions: EnvironmentCondition {
            temperature,
            humidity,
            wind_speed,
            wind_direction,
            precipitation,
            solar_radiation,
            road_surface_temp: None,
        },
    }
}

static PRESETS: LazyLock<Vec<(&'static str, ClimatePreset)>> = LazyLock::new(|| {
    vec![
        (
            "gangwon_winter_severe",
            preset("Gangwon Winter (Severe)", "Gangwon-do", -15.0, 65.0, 8.0, 315.0, 5.0, 50.0),
        ),
        (
            "gangwon_winter_moderate",
            preset("Gangwon Winter (Moderate)", "Gangwon-do", -5.0, 70.0, 4.0, 270.0, 2.0, 100.0),
        ),
        (
            "seoul_winter",
            preset("Seoul Winter", "Seoul", -8.0, 55.0, 5.0, 300.0, 1.0, 120.0),
        ),
        (
            "gyeongbu_expressway_winter",
            preset(
                "Gyeongbu Expressway Winter",
                "Chungcheong-do",
                -3.0,
                75.0,
                6.0,
                250.0,
                3.0,
                80.0,
            ),
        ),
        (
            "yeongdong_expressway_winter",
            preset(
                "Yeongdong Expressway Winter",
                "Gangwon-do",
                -12.0,
                80.0,
                10.0,
                0.0,
                8.0,
                30.0,
            ),
        ),
        (
            "busan_winter",
            preset("Busan Winter", "Busan", 0.0, 60.0, 7.0, 180.0, 0.5, 150.0),
        ),
        (
            "spring_transition",
            preset("Spring Transition (March)", "National", 5.0, 50.0, 3.0, 225.0, 0.0, 250.0),
        ),
        (
            "night_clear_sky",
            preset(
                "Night Clear Sky (Max Radiative Cooling)",
                "National",
                -2.0,
                40.0,
                1.0,
                0.0,
                0.0,
                0.0,
            ),
        ),
    ]
});

/// Looks up a climate preset by key.
pub fn get_preset(name: &str) -> Option<&'static ClimatePreset> {
    PRESETS.iter().find(|(key, _)| *key == name).map(|(_, p)| p)
}

/// Looks up a climate preset, falling back to [`DEFAULT_PRESET`] for unknown
/// keys. The fallback is logged so the substitution stays auditable.
pub fn get_preset_or_default(name: &str) -> &'static ClimatePreset {
    match get_preset(name) {
        Some(p) => p,
        None => {
            warn!(requested = name, fallback = DEFAULT_PRESET, "unknown climate preset, using default");
            // The default key is registered above; a scan cannot miss it.
            get_preset(DEFAULT_PRESET).unwrap_or_else(|| unreachable!())
        }
    }
}

/// All registered preset keys, in registration order.
pub fn list_presets() -> Vec<&'static str> {
    PRESETS.iter().map(|(key, _)| *key).collect()
}
