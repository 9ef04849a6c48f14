use crate::fetch::RayWeighting;
use serde::{Deserialize, Serialize};

/// How the corrected roughness factor γ_f* is evaluated for overtopping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RoughnessCorrection {
    /// Evaluate once from a fixed reference freeboard (m)
    Provisional { rcp: f64 },
    /// Re-evaluate from the current freeboard at every solver step
    Iterative,
}

impl Default for RoughnessCorrection {
    fn default() -> Self {
        RoughnessCorrection::Provisional { rcp: 1.9 }
    }
}

/// Solver tolerances, defaults and policy switches for the calculators.
///
/// Every field has a default, so a JSON settings file only needs the keys
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcSettings {
    /// Iteration cap for both the ΔH and the Rcp solvers
    pub max_iterations: usize,
    /// ΔH convergence threshold on successive iterates, m
    pub wave_setup_tolerance: f64,
    /// |d + 0.5·ΔH| below this is treated as singular
    pub singular_threshold: f64,
    /// Accepted relative gap between computed and allowed discharge
    pub overtopping_tolerance_fraction: f64,
    /// Fetch used when a ray fan is malformed, m
    pub default_fetch_m: f64,
    /// Design wind for classes I/II raised to the 1 % storm
    pub special_justification: bool,
    pub river_ray_weighting: RayWeighting,
    pub roughness_correction: RoughnessCorrection,
    /// Construction freeboard b used when a river row leaves it blank, m
    pub river_construction_freeboard: f64,
    /// Settlement allowance s used when a river row leaves it blank, m
    pub river_settlement: f64,
}

impl Default for CalcSettings {
    fn default() -> Self {
        CalcSettings {
            max_iterations: 100,
            wave_setup_tolerance: 1e-6,
            singular_threshold: 1e-10,
            overtopping_tolerance_fraction: 0.05,
            default_fetch_m: 2200.0,
            special_justification: false,
            river_ray_weighting: RayWeighting::Cosine,
            roughness_correction: RoughnessCorrection::default(),
            river_construction_freeboard: 0.2,
            river_settlement: 0.1,
        }
    }
}

impl CalcSettings {
    pub fn from_json(json: &str) -> serde_json::Result<CalcSettings> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CalcSettings::default();
        assert_eq!(settings.max_iterations, 100);
        assert_eq!(settings.default_fetch_m, 2200.0);
        assert_eq!(
            settings.roughness_correction,
            RoughnessCorrection::Provisional { rcp: 1.9 }
        );
    }

    #[test]
    fn test_partial_json() {
        let settings = CalcSettings::from_json(
            r#"{"special_justification": true, "roughness_correction": {"mode": "iterative"}}"#,
        )
        .unwrap();
        assert!(settings.special_justification);
        assert_eq!(settings.roughness_correction, RoughnessCorrection::Iterative);
        assert_eq!(settings.wave_setup_tolerance, 1e-6);
        assert_eq!(settings.river_ray_weighting, RayWeighting::Cosine);
    }

    #[test]
    fn test_provisional_json() {
        let settings = CalcSettings::from_json(
            r#"{"roughness_correction": {"mode": "provisional", "rcp": 2.5}, "river_ray_weighting": "cosine_squared"}"#,
        )
        .unwrap();
        assert_eq!(
            settings.roughness_correction,
            RoughnessCorrection::Provisional { rcp: 2.5 }
        );
        assert_eq!(settings.river_ray_weighting, RayWeighting::CosineSquared);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(CalcSettings::from_json(r#"{"roughness_correction": {"mode": "guess"}}"#).is_err());
    }
}
