//! Thermal engine: road surface temperature and icing classification.
//!
//! Solves a steady-state energy balance on the pavement surface (solar
//! absorption, Jürges convection, radiative exchange with an estimated sky
//! temperature) by Newton iteration, then applies brine freezing-point
//! depression to classify icing risk.

use crate::domain::constants::{
    DEFAULT_BRINE_CONCENTRATION, FREEZING_POINT_WATER, ICE_WARNING_TEMP, NACL_EUTECTIC_CONC,
    STEFAN_BOLTZMANN,
};
use crate::domain::{EnvironmentCondition, PhysicsAsset, PhysicsParams, AssetType};

use super::{PhysicsEngine, PhysicsError, Prediction, ThermalPrediction};

/// Newton iteration cap for the surface-temperature solve.
const MAX_ITERATIONS: usize = 50;
/// Energy-balance residual considered converged (W/m^2).
const RESIDUAL_TOLERANCE: f64 = 0.01;
/// Temperature margin equivalent to SF = 1.0 (°C). 5 °C of margin maps to
/// the 1.5 target, so one unit of safety factor is 5/1.5 degrees.
const REFERENCE_MARGIN: f64 = 5.0 / 1.5;

/// Road surface thermal model.
#[derive(Debug, Clone, Copy)]
pub struct ThermalEngine {
    pub surface_emissivity: f64,
    pub solar_absorptivity: f64,
}

impl Default for ThermalEngine {
    fn default() -> Self {
        Self {
            surface_emissivity: 0.93,
            solar_absorptivity: 0.85,
        }
    }
}

impl ThermalEngine {
    /// Jürges correlation for forced convection over a flat surface:
    /// h = 5.7 + 3.8 v.
    fn convective_coeff(wind_speed: f64) -> f64 {
        5.7 + 3.8 * wind_speed
    }

    /// Effective sky temperature for radiative cooling (°C).
    fn sky_temperature(air_temp: f64, humidity: f64) -> f64 {
        let t_air_k = air_temp + 273.15;
        let emissivity_factor = (0.8 + humidity / 500.0).powf(0.25);
        t_air_k * emissivity_factor - 273.15
    }

    /// Linear freezing-point depression, capped at the eutectic concentration.
    fn freezing_point_depression(brine_concentration: f64) -> f64 {
        -0.6 * brine_concentration.min(NACL_EUTECTIC_CONC)
    }

    /// Newton iteration on the surface energy-balance residual.
    fn solve_surface_temperature(
        &self,
        air_temp: f64,
        wind_speed: f64,
        humidity: f64,
        solar_radiation: f64,
    ) -> f64 {
        let h_conv = Self::convective_coeff(wind_speed);
        let t_sky_k = Self::sky_temperature(air_temp, humidity) + 273.15;
        let t_air_k = air_temp + 273.15;

        let mut t_surface = air_temp;
        for _ in 0..MAX_ITERATIONS {
            let t_s_k = t_surface + 273.15;
            let q_solar = self.solar_absorptivity * solar_radiation;
            let q_conv = h_conv * (t_air_k - t_s_k);
            let q_rad =
                self.surface_emissivity * STEFAN_BOLTZMANN * (t_sky_k.powi(4) - t_s_k.powi(4));
            let residual = q_solar + q_conv + q_rad;

            let derivative =
                -h_conv - 4.0 * self.surface_emissivity * STEFAN_BOLTZMANN * t_s_k.powi(3);
            if derivative.abs() < 1e-12 {
                break;
            }
            t_surface -= residual / derivative;
            if residual.abs() < RESIDUAL_TOLERANCE {
                break;
            }
        }
        t_surface
    }
}

impl PhysicsEngine for ThermalEngine {
    fn predict(
        &self,
        assets: &[PhysicsAsset],
        environment: &EnvironmentCondition,
        params: Option<&PhysicsParams>,
    ) -> Result<Prediction, PhysicsError> {
        // A measured surface temperature short-circuits the energy balance.
        let mut surface_temp = match environment.road_surface_temp {
            Some(measured) => measured,
            None => self.solve_surface_temperature(
                environment.temperature,
                environment.wind_speed,
                environment.humidity,
                environment.solar_radiation,
            ),
        };

        if let Some(correction) = params.and_then(|p| p.get("temp_correction")) {
            surface_temp += correction;
        }

        if !surface_temp.is_finite() {
            return Err(PhysicsError::NonFinite {
                engine: "thermal",
                quantity: "surface_temperature",
            });
        }

        let concentrations: Vec<f64> = assets
            .iter()
            .filter(|a| a.asset_type == AssetType::SprayDevice)
            .map(|a| a.prop_f64("brine_concentration", DEFAULT_BRINE_CONCENTRATION))
            .collect();
        let brine_concentration = if concentrations.is_empty() {
            0.0
        } else {
            concentrations.iter().sum::<f64>() / concentrations.len() as f64
        };

        let depression = Self::freezing_point_depression(brine_concentration);
        let freezing_point = FREEZING_POINT_WATER + depression;
        let is_icing = surface_temp <= freezing_point;
        let is_warning = surface_temp <= ICE_WARNING_TEMP && !is_icing;

        Ok(Prediction::Thermal(ThermalPrediction {
            surface_temperature: surface_temp,
            air_temperature: environment.temperature,
            freezing_point,
            freezing_point_depression: depression,
            brine_concentration,
            is_icing,
            is_warning,
            temperature_margin: surface_temp - freezing_point,
            convective_coeff: Self::convective_coeff(environment.wind_speed),
        }))
    }

    fn safety_factor(&self, prediction: &Prediction, _environment: &EnvironmentCondition) -> f64 {
        let margin = match prediction {
            Prediction::Thermal(t) => t.temperature_margin,
            Prediction::Coverage(_) => return 0.0,
        };
        (margin / REFERENCE_MARGIN).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spray_device(concentration: f64) -> PhysicsAsset {
        let mut a = PhysicsAsset::new("spray-001", AssetType::SprayDevice);
        a.properties.insert("brine_concentration".into(), json!(concentration));
        a
    }

    fn thermal(prediction: &Prediction) -> &ThermalPrediction {
        match prediction {
            Prediction::Thermal(t) => t,
            Prediction::Coverage(_) => panic!("expected thermal prediction"),
        }
    }

    #[test]
    fn cold_night_predicts_icing_fields() {
        let engine = ThermalEngine::default();
        let env = EnvironmentCondition {
            temperature: -5.0,
            humidity: 70.0,
            wind_speed: 4.0,
            solar_radiation: 100.0,
            ..Default::default()
        };
        let prediction = engine.predict(&[spray_device(23.0)], &env, None).unwrap();
        let t = thermal(&prediction);
        assert!(t.surface_temperature < 5.0);
        assert!(t.freezing_point < 0.0);
        assert_eq!(t.air_temperature, -5.0);
    }

    #[test]
    fn eutectic_brine_depresses_freezing_point_below_minus_ten() {
        let depression = ThermalEngine::freezing_point_depression(23.0);
        assert!(depression < -10.0);
        // Concentration past the eutectic point gains nothing.
        let capped = ThermalEngine::freezing_point_depression(40.0);
        assert!((capped - ThermalEngine::freezing_point_depression(23.3)).abs() < 1e-12);
    }

    #[test]
    fn warm_conditions_do_not_ice() {
        let engine = ThermalEngine::default();
        let env = EnvironmentCondition {
            temperature: 10.0,
            humidity: 50.0,
            wind_speed: 2.0,
            solar_radiation: 300.0,
            ..Default::default()
        };
        let prediction = engine.predict(&[spray_device(23.0)], &env, None).unwrap();
        assert!(!thermal(&prediction).is_icing);
    }

    #[test]
    fn measured_surface_temperature_bypasses_the_solver() {
        let engine = ThermalEngine::default();
        let env = EnvironmentCondition {
            temperature: -5.0,
            road_surface_temp: Some(-12.5),
            ..Default::default()
        };
        let prediction = engine.predict(&[], &env, None).unwrap();
        assert_eq!(thermal(&prediction).surface_temperature, -12.5);
    }

    #[test]
    fn temp_correction_shifts_the_solved_temperature() {
        let engine = ThermalEngine::default();
        let env = EnvironmentCondition {
            temperature: -5.0,
            road_surface_temp: Some(-3.0),
            ..Default::default()
        };
        let mut params = PhysicsParams::new();
        params.insert("temp_correction".into(), 1.5);
        let prediction = engine.predict(&[], &env, Some(&params)).unwrap();
        assert!((thermal(&prediction).surface_temperature - -1.5).abs() < 1e-12);
    }

    #[test]
    fn safety_factor_floors_at_zero() {
        let engine = ThermalEngine::default();
        let env = EnvironmentCondition {
            temperature: -20.0,
            road_surface_temp: Some(-20.0),
            ..Default::default()
        };
        let prediction = engine.predict(&[], &env, None).unwrap();
        let sf = engine.safety_factor(&prediction, &env);
        assert_eq!(sf, 0.0);
    }

    #[test]
    fn no_brine_means_plain_water_freezing_point() {
        let engine = ThermalEngine::default();
        let env = EnvironmentCondition {
            road_surface_temp: Some(-1.0),
            ..Default::default()
        };
        let prediction = engine.predict(&[], &env, None).unwrap();
        let t = thermal(&prediction);
        assert_eq!(t.freezing_point, 0.0);
        assert!(t.is_icing);
    }
}
