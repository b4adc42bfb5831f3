//! Shared fixtures for unit tests.

use crate::project::{
    BrineSprayDevice, InstallationType, RoadSegment, RoadType, SimulationProject, SprayPattern,
    SupplySystem, SurfaceMaterial,
};
use crate::site::{
    ClimateCondition, EnvironmentContext, PrecipitationType, Season, TimeOfDay, TrafficLevel,
};

pub fn mild_climate() -> ClimateCondition {
    ClimateCondition {
        air_temperature_c: -3.0,
        road_surface_temperature_c: -5.0,
        humidity_percent: 60.0,
        wind_speed_ms: 1.0,
        wind_direction_deg: 0.0,
        precipitation_type: PrecipitationType::None,
        precipitation_intensity_mmh: 0.0,
        solar_radiation_wm2: 0.0,
        cloud_cover_percent: 50.0,
    }
}

pub fn test_env() -> EnvironmentContext {
    test_env_at("Test Road")
}

pub fn test_env_at(location_name: &str) -> EnvironmentContext {
    EnvironmentContext {
        location_name: location_name.into(),
        latitude: 37.0,
        longitude: 127.0,
        elevation_m: 50.0,
        season: Season::Winter,
        time_of_day: TimeOfDay::Night,
        climate: mild_climate(),
        traffic_level: TrafficLevel::Low,
        is_shaded: false,
        is_wind_exposed: true,
    }
}

pub fn test_road(road_length: f64) -> RoadSegment {
    RoadSegment {
        segment_id: "TEST-ROAD".into(),
        road_type: RoadType::Straight,
        surface_material: SurfaceMaterial::Asphalt,
        length_m: road_length,
        width_m: 3.5,
        lanes: 2,
        slope_percent: 0.0,
        elevation_m: 50.0,
        has_median: false,
        has_shoulder: true,
        shoulder_width_m: 2.0,
    }
}

pub fn test_supply() -> SupplySystem {
    SupplySystem {
        tank_capacity_l: 5000.0,
        pump_pressure_bar: 5.0,
        pipe_diameter_mm: 50.0,
        pipe_material: "HDPE".into(),
        pipe_burial_depth_mm: 700.0,
        has_heating: true,
        has_insulation: false,
    }
}

/// Evenly spaced fan devices over a single straight segment.
pub fn test_project(n_devices: usize, road_length: f64, burial_depth_mm: f64) -> SimulationProject {
    let spacing = road_length / (n_devices as f64 + 1.0);
    let devices = (0..n_devices)
        .map(|i| BrineSprayDevice {
            device_id: format!("SPR-{:03}", i + 1),
            position_along_road_m: spacing * (i as f64 + 1.0),
            position_cross_m: 0.0,
            installation_type: InstallationType::FlushMounted,
            burial_depth_mm,
            spray_pattern: SprayPattern::Fan,
            spray_angle_deg: 120.0,
            spray_range_m: 8.0,
            flow_rate_lpm: 5.0,
            nozzle_diameter_mm: 12.0,
            brine_concentration_percent: 23.0,
        })
        .collect();
    SimulationProject {
        project_id: "TEST-PROJECT".into(),
        project_name: "Test Project".into(),
        location_name: "Test Road".into(),
        latitude: 37.0,
        longitude: 127.0,
        road_segments: vec![test_road(road_length)],
        spray_devices: devices,
        supply_system: Some(test_supply()),
        ..Default::default()
    }
}
