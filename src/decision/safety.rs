//! Safety-factor helpers shared across engine families.
//!
//! SF = capacity / demand. Spray capacity is effective brine coverage against
//! the KDS minimum; thermal capacity is temperature margin above the
//! depressed freezing point.

use crate::domain::constants::KDS_MIN_BRINE_COVERAGE;

/// SF for spray coverage: actual / required. Unbounded when nothing is
/// required.
pub fn spray_safety_factor(coverage_ratio: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return f64::INFINITY;
    }
    coverage_ratio / required
}

/// SF for spray coverage against the KDS minimum.
pub fn spray_safety_factor_kds(coverage_ratio: f64) -> f64 {
    spray_safety_factor(coverage_ratio, KDS_MIN_BRINE_COVERAGE)
}

/// SF for thermal margin: (surface - freezing point) / reference margin,
/// floored at zero.
pub fn thermal_safety_factor(surface_temp: f64, freezing_point: f64, reference_margin: f64) -> f64 {
    if reference_margin <= 0.0 {
        return 0.0;
    }
    ((surface_temp - freezing_point) / reference_margin).max(0.0)
}

/// Weighted blend of spray and thermal safety factors.
pub fn combined_safety_factor(spray_sf: f64, thermal_sf: f64, weights: (f64, f64)) -> f64 {
    spray_sf * weights.0 + thermal_sf * weights.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spray_sf_is_ratio_against_requirement() {
        assert!((spray_safety_factor(0.85, 0.85) - 1.0).abs() < 1e-12);
        assert!(spray_safety_factor(0.5, 0.0).is_infinite());
        assert_eq!(spray_safety_factor_kds(0.0), 0.0);
    }

    #[test]
    fn thermal_sf_floors_at_zero() {
        assert_eq!(thermal_safety_factor(-10.0, -5.0, 3.33), 0.0);
        let sf = thermal_safety_factor(0.0, -5.0, 3.33);
        assert!(sf > 1.0);
        assert_eq!(thermal_safety_factor(5.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn combined_sf_uses_weights() {
        let sf = combined_safety_factor(2.0, 1.0, (0.6, 0.4));
        assert!((sf - 1.6).abs() < 1e-12);
    }
}
