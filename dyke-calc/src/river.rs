//! River dyke crest against wind-driven wave setup.
//!
//! Zds = Htk + ΔH + a + b + s, where ΔH solves
//!
//! ```text
//! ΔH = Kw(Vw) · Vw² · L · cos(aw) / (g · (d + 0.5·ΔH))
//! ```
//!
//! with Vw = kfl · kl · Vl the local design wind speed.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{defined, positive, CalcError, Result};
use crate::fetch::{limited_wide_fetch, narrow_fetch};
use crate::interpolation::{interpolate, Interpolated};
use crate::settings::CalcSettings;
use crate::solver::{iterate, Solution, Step};
use crate::GRAVITY;
use dyke_tables::{DesignWind, DykeClass, Tables, Terrain};
use serde::{Deserialize, Serialize};

/// Where the fetch L of a river site comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FetchInput {
    /// 13 ray lengths, m
    Rays(Vec<f64>),
    /// A fetch length already known, m
    Direct(f64),
    /// Wide water: derive from the local wind speed, capped by Dmax
    WideWater,
    /// Ray input that could not be read at all
    Malformed(String),
}

/// One river dyke line.
///
/// Class and terrain are kept as the keys the user typed; an unrecognised
/// key leaves the dependent fields undefined instead of rejecting the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiverSite {
    pub line: String,
    pub class: String,
    pub terrain: String,
    /// Htk, m
    pub design_water_level: Option<f64>,
    /// d, m
    pub depth: Option<f64>,
    /// aw, degrees
    pub wind_angle: Option<f64>,
    pub fetch: FetchInput,
    /// b, m; the settings default applies when blank
    pub construction_freeboard: Option<f64>,
    /// s, m; the settings default applies when blank
    pub settlement: Option<f64>,
}

/// Intermediate and final values for one river site.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RiverResult {
    pub line: String,
    /// Vl, m/s
    pub design_wind_speed: Option<f64>,
    /// Storm return frequency, %
    pub storm_frequency: Option<f64>,
    pub wind_basis: Option<String>,
    pub kfl: Option<f64>,
    pub kl: Option<f64>,
    /// Vw, m/s
    pub local_wind_speed: Option<f64>,
    /// L, m
    pub fetch_m: Option<f64>,
    pub fetch_numerator: Option<f64>,
    pub fetch_denominator: Option<f64>,
    pub kw: Option<f64>,
    /// ΔH, m
    pub wave_setup: Option<f64>,
    pub wave_setup_iterations: Option<usize>,
    pub wave_setup_converged: Option<bool>,
    /// a, m
    pub safety_margin: Option<f64>,
    /// Zds, m
    pub crest_elevation: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fetch length resolved for the ΔH solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFetch {
    pub length_m: f64,
    pub numerator: Option<f64>,
    pub denominator: Option<f64>,
}

/// ΔH fixed-point problem with its physical constants folded in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSetup {
    /// Kw · Vw² · L · cos(aw) / g
    pub forcing: f64,
    /// d, m
    pub depth: f64,
    pub tolerance: f64,
    pub singular_threshold: f64,
}

impl WaveSetup {
    pub fn new(kw: f64, wind_speed: f64, fetch_m: f64, depth: f64, angle_deg: f64, settings: &CalcSettings) -> Self {
        WaveSetup {
            forcing: kw * wind_speed.powi(2) * fetch_m * angle_deg.to_radians().cos() / GRAVITY,
            depth,
            tolerance: settings.wave_setup_tolerance,
            singular_threshold: settings.singular_threshold,
        }
    }

    /// ΔHₙ₊₁ from ΔHₙ.
    pub fn step(&self, iteration: usize, setup: f64) -> Result<Step> {
        let denominator = self.depth + 0.5 * setup;
        if denominator.abs() < self.singular_threshold {
            return Err(CalcError::Singular { iteration });
        }
        let next = self.forcing / denominator;
        if (next - setup).abs() < self.tolerance {
            Ok(Step::Converged(next))
        } else {
            Ok(Step::Continue(next))
        }
    }

    /// Iterate from ΔH₀ = 0.
    pub fn solve(&self, max_iterations: usize) -> Result<Solution> {
        iterate(0.0, max_iterations, |iteration, setup| self.step(iteration, setup))
    }
}

/// Gust/duration factor kfl = min(0.675 + 4.5/Vl, 1.0).
pub fn gust_factor(design_wind_speed: f64) -> Result<f64> {
    let vl = positive("Vl", Some(design_wind_speed))?;
    Ok((0.675 + 4.5 / vl).min(1.0))
}

/// Vw = kfl · kl · Vl; every factor must be positive.
pub fn local_wind_speed(kfl: f64, kl: f64, design_wind_speed: f64) -> Result<f64> {
    let kfl = positive("kfl", Some(kfl))?;
    let kl = positive("kl", Some(kl))?;
    let vl = positive("Vl", Some(design_wind_speed))?;
    Ok(kfl * kl * vl)
}

/// Calculator for river dyke lines.
pub struct RiverCalculator<'a> {
    tables: &'a Tables,
    settings: &'a CalcSettings,
}

impl<'a> RiverCalculator<'a> {
    pub fn new(tables: &'a Tables, settings: &'a CalcSettings) -> Self {
        RiverCalculator { tables, settings }
    }

    /// Design wind for a class key.
    pub fn design_wind(&self, class: &str) -> Result<DesignWind> {
        let class: DykeClass = class.parse()?;
        Ok(class.design_wind(self.settings.special_justification)?)
    }

    /// Terrain roughness factor kl: 1.0 on smooth surfaces, otherwise read
    /// from the terrain's column at Vl.
    pub fn terrain_factor(&self, design_wind_speed: f64, terrain: &str) -> Result<Interpolated> {
        let vl = positive("Vl", Some(design_wind_speed))?;
        let terrain: Terrain = terrain.parse()?;
        if terrain.is_smooth() {
            return Ok(Interpolated::exact(1.0));
        }
        let table = self
            .tables
            .kl_table(terrain)
            .ok_or_else(|| CalcError::Table(format!("no kl table for terrain '{}'", terrain)))?;
        interpolate(table, vl)
    }

    /// Resolve the fetch L (m) of a site. `wind` is (Vw, Vl), needed only
    /// for wide water.
    pub fn resolve_fetch(
        &self,
        fetch: &FetchInput,
        wind: Option<(f64, f64)>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ResolvedFetch> {
        match fetch {
            FetchInput::Rays(rays) => match narrow_fetch(rays, self.settings.river_ray_weighting) {
                Ok(fan) => {
                    if fan.effective <= 0.0 {
                        return Err(CalcError::NotApplicable {
                            formula: "narrow-water fetch",
                            reason: "insufficient directional data (De = 0)".to_string(),
                        });
                    }
                    Ok(ResolvedFetch {
                        length_m: fan.effective,
                        numerator: Some(fan.numerator),
                        denominator: Some(fan.denominator),
                    })
                }
                Err(err @ CalcError::MalformedRays { .. }) => {
                    Ok(self.substitute_fetch(&err.to_string(), diagnostics))
                }
                Err(err) => Err(err),
            },
            FetchInput::Malformed(reason) => Ok(self.substitute_fetch(reason, diagnostics)),
            FetchInput::Direct(length) => {
                let length = defined("L", Some(*length))?;
                if length < 0.0 {
                    return Err(CalcError::NonPositive {
                        name: "L",
                        value: length,
                    });
                }
                Ok(ResolvedFetch {
                    length_m: length,
                    numerator: None,
                    denominator: None,
                })
            }
            FetchInput::WideWater => {
                let (vw, vl) = wind.ok_or(CalcError::Undefined("Vw"))?;
                let limit = diagnostics.lookup("Lu", &self.tables.limiting_fetch, vl);
                let wide = limited_wide_fetch(vw, limit).ok_or(CalcError::NonPositive {
                    name: "Vw",
                    value: vw,
                })?;
                Ok(ResolvedFetch {
                    length_m: wide.effective_km * 1000.0,
                    numerator: None,
                    denominator: None,
                })
            }
        }
    }

    fn substitute_fetch(&self, reason: &str, diagnostics: &mut Diagnostics) -> ResolvedFetch {
        diagnostics.note(
            DiagnosticKind::Substituted,
            "L",
            format!(
                "{}; default fetch {} m used",
                reason, self.settings.default_fetch_m
            ),
        );
        ResolvedFetch {
            length_m: self.settings.default_fetch_m,
            numerator: None,
            denominator: None,
        }
    }

    /// Solve ΔH for a local wind speed, fetch, depth and incidence angle.
    /// Returns the solution and the Kw used.
    pub fn wave_setup(
        &self,
        wind_speed: f64,
        fetch_m: f64,
        depth: f64,
        angle_deg: f64,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Solution, f64)> {
        let vw = positive("Vw", Some(wind_speed))?;
        let depth = positive("d", Some(depth))?;
        let fetch_m = defined("L", Some(fetch_m))?;
        if fetch_m < 0.0 {
            return Err(CalcError::NonPositive {
                name: "L",
                value: fetch_m,
            });
        }
        let angle = defined("aw", Some(angle_deg))?;
        let kw = diagnostics
            .lookup("Kw", &self.tables.kw, vw)
            .ok_or(CalcError::Undefined("Kw"))?;
        let solution = WaveSetup::new(kw, vw, fetch_m, depth, angle, self.settings)
            .solve(self.settings.max_iterations)?;
        if !solution.converged {
            diagnostics.note(
                DiagnosticKind::NonConvergence,
                "ΔH",
                format!(
                    "no convergence after {} iterations, last iterate {:.6} m kept",
                    solution.iterations, solution.value
                ),
            );
        }
        Ok((solution, kw))
    }

    pub fn calculate(&self, site: &RiverSite) -> RiverResult {
        let mut diagnostics = Diagnostics::for_row(site.line.clone());
        let mut result = RiverResult {
            line: site.line.clone(),
            ..RiverResult::default()
        };

        let wind = diagnostics.take("Vl", self.design_wind(&site.class));
        if let Some(wind) = wind {
            result.design_wind_speed = Some(wind.speed);
            result.storm_frequency = Some(wind.storm_frequency);
            result.wind_basis = Some(wind.explanation.to_string());
        }

        let vl = result.design_wind_speed;
        result.kfl = vl.and_then(|vl| diagnostics.take("kfl", gust_factor(vl)));
        result.kl = vl.and_then(|vl| {
            let kl = diagnostics.take("kl", self.terrain_factor(vl, &site.terrain))?;
            if let Some(clamp) = kl.clamp {
                diagnostics.note(
                    DiagnosticKind::OutOfRange(clamp),
                    "kl",
                    format!("Vl = {:.2} outside the kl table, {}", vl, clamp),
                );
            }
            Some(kl.value)
        });
        result.local_wind_speed = match (result.kfl, result.kl, vl) {
            (Some(kfl), Some(kl), Some(vl)) => diagnostics.take("Vw", local_wind_speed(kfl, kl, vl)),
            _ => None,
        };

        let wind_pair = result.local_wind_speed.zip(vl);
        let fetch_result = self.resolve_fetch(&site.fetch, wind_pair, &mut diagnostics);
        let fetch = match (&site.fetch, fetch_result) {
            // wide-water fetch without a wind speed is already explained upstream
            (FetchInput::WideWater, Err(CalcError::Undefined(_))) => None,
            (_, fetch_result) => diagnostics.take("L", fetch_result),
        };
        if let Some(fetch) = fetch {
            result.fetch_m = Some(fetch.length_m);
            result.fetch_numerator = fetch.numerator;
            result.fetch_denominator = fetch.denominator;
        }

        if let (Some(vw), Some(fetch_m)) = (result.local_wind_speed, result.fetch_m) {
            let inputs = defined("d", site.depth).and_then(|d| Ok((d, defined("aw", site.wind_angle)?)));
            let setup = inputs.and_then(|(depth, angle)| {
                self.wave_setup(vw, fetch_m, depth, angle, &mut diagnostics)
            });
            if let Some((solution, kw)) = diagnostics.take("ΔH", setup) {
                result.kw = Some(kw);
                result.wave_setup = Some(solution.value);
                result.wave_setup_iterations = Some(solution.iterations);
                result.wave_setup_converged = Some(solution.converged);
            }
        }

        result.safety_margin = diagnostics.take(
            "a",
            site.class
                .parse::<DykeClass>()
                .and_then(|class| self.tables.margins.river(class))
                .map_err(CalcError::from),
        );

        let freeboard = site
            .construction_freeboard
            .unwrap_or(self.settings.river_construction_freeboard);
        let settlement = site.settlement.unwrap_or(self.settings.river_settlement);
        let water_level = diagnostics.take("Htk", defined("Htk", site.design_water_level));
        result.crest_elevation = match (water_level, result.wave_setup, result.safety_margin) {
            (Some(htk), Some(setup), Some(margin)) => {
                let crest = htk + setup + margin + freeboard + settlement;
                crest.is_finite().then_some(crest)
            }
            _ => None,
        };

        result.diagnostics = diagnostics.into_vec();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_water_site() -> RiverSite {
        RiverSite {
            line: "K12".to_string(),
            class: "IV".to_string(),
            terrain: "MẶT NƯỚC".to_string(),
            design_water_level: Some(4.5),
            depth: Some(5.0),
            wind_angle: Some(10.0),
            fetch: FetchInput::Rays(vec![2000.0; 13]),
            construction_freeboard: None,
            settlement: None,
        }
    }

    #[test]
    fn test_gust_factor() {
        assert!((gust_factor(33.0).unwrap() - (0.675 + 4.5 / 33.0)).abs() < 1e-15);
        assert_eq!(gust_factor(10.0).unwrap(), 1.0);
        assert!(gust_factor(0.0).is_err());
    }

    #[test]
    fn test_local_wind_speed() {
        assert!((local_wind_speed(0.8, 1.0, 33.0).unwrap() - 26.4).abs() < 1e-12);
        assert!(local_wind_speed(0.8, -1.0, 33.0).is_err());
    }

    #[test]
    fn test_terrain_factor() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        assert_eq!(calculator.terrain_factor(33.0, "Tuyết phủ").unwrap().value, 1.0);
        let kl = calculator.terrain_factor(33.0, "B").unwrap();
        assert!((kl.value - (1.24 + (1.22 - 1.24) * 3.0 / 5.0)).abs() < 1e-12);
        let kl = calculator.terrain_factor(45.0, "C").unwrap();
        assert_eq!(kl.value, 1.34);
        assert!(kl.clamp.is_some());
        assert!(matches!(
            calculator.terrain_factor(33.0, "Rừng"),
            Err(CalcError::Table(_))
        ));
    }

    #[test]
    fn test_wave_setup_zero_fetch() {
        let setup = WaveSetup {
            forcing: 0.0,
            depth: 5.0,
            tolerance: 1e-6,
            singular_threshold: 1e-10,
        };
        let solution = setup.solve(100).unwrap();
        assert_eq!(solution.value, 0.0);
        assert_eq!(solution.iterations, 1);
        assert!(solution.converged);
    }

    #[test]
    fn test_wave_setup_singular() {
        // ΔH₁ = -2 / -1 = 2, then d + 0.5·ΔH₁ = 0
        let setup = WaveSetup {
            forcing: -2.0,
            depth: -1.0,
            tolerance: 1e-6,
            singular_threshold: 1e-10,
        };
        assert_eq!(setup.solve(100), Err(CalcError::Singular { iteration: 2 }));
    }

    #[test]
    fn test_wave_setup_iteration_cap() {
        let settings = CalcSettings::default();
        let setup = WaveSetup::new(2.70975e-6, 26.775, 2000.0, 5.0, 10.0, &settings);
        let solution = setup.solve(2).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 2);
        assert!(solution.value > 0.0);
    }

    #[test]
    fn test_open_water_scenario() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let result = calculator.calculate(&open_water_site());

        assert_eq!(result.design_wind_speed, Some(33.0));
        assert_eq!(result.storm_frequency, Some(4.0));
        assert!((result.kfl.unwrap() - (0.675 + 4.5 / 33.0_f64).min(1.0)).abs() < 1e-15);
        assert_eq!(result.kl, Some(1.0));
        assert!((result.local_wind_speed.unwrap() - 26.775).abs() < 1e-12);
        assert!((result.fetch_m.unwrap() - 2000.0).abs() < 1e-9);
        assert!((result.kw.unwrap() - 2.70975e-6).abs() < 1e-15);
        assert!((result.wave_setup.unwrap() - 0.07740728127752203).abs() < 1e-9);
        assert_eq!(result.wave_setup_iterations, Some(4));
        assert_eq!(result.wave_setup_converged, Some(true));
        assert_eq!(result.safety_margin, Some(0.3));
        assert!((result.crest_elevation.unwrap() - 5.177407281277522).abs() < 1e-9);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_rays_use_default_fetch() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            fetch: FetchInput::Rays(vec![1800.0, 1900.0, 2000.0]),
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        assert_eq!(result.fetch_m, Some(2200.0));
        assert!(result.crest_elevation.is_some());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Substituted);
    }

    #[test]
    fn test_all_zero_rays_are_insufficient() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            fetch: FetchInput::Rays(vec![0.0; 13]),
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        assert_eq!(result.fetch_m, None);
        assert_eq!(result.crest_elevation, None);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::NotApplicable);
    }

    #[test]
    fn test_wide_water_fetch() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            fetch: FetchInput::WideWater,
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        // D = 5000/26.775 km ≈ 186.7 km, Lu(33) = 480 km
        let expected = 5e6 / 26.775;
        assert!((result.fetch_m.unwrap() - expected).abs() < 1e-6);
        assert!(result.wave_setup.unwrap() > 0.0);
        assert!(result.crest_elevation.is_some());
    }

    #[test]
    fn test_unknown_terrain_leaves_row_partial() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            terrain: "Rừng".to_string(),
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        assert_eq!(result.design_wind_speed, Some(33.0));
        assert!(result.kfl.is_some());
        assert_eq!(result.kl, None);
        assert_eq!(result.local_wind_speed, None);
        assert_eq!(result.wave_setup, None);
        assert_eq!(result.safety_margin, Some(0.3));
        assert_eq!(result.crest_elevation, None);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].field, "kl");
    }

    #[test]
    fn test_special_class_has_margin_but_no_wind() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            class: "Đặc biệt".to_string(),
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        assert_eq!(result.design_wind_speed, None);
        assert_eq!(result.safety_margin, Some(0.8));
        assert_eq!(result.crest_elevation, None);
        assert_eq!(result.diagnostics[0].field, "Vl");
    }

    #[test]
    fn test_special_justification() {
        let settings = CalcSettings {
            special_justification: true,
            ..CalcSettings::default()
        };
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            class: "I".to_string(),
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        assert_eq!(result.design_wind_speed, Some(40.0));
        assert_eq!(result.storm_frequency, Some(1.0));
        assert_eq!(result.kfl, Some(0.675 + 4.5 / 40.0));
    }

    #[test]
    fn test_missing_depth() {
        let settings = CalcSettings::default();
        let calculator = RiverCalculator::new(Tables::standard(), &settings);
        let site = RiverSite {
            depth: None,
            ..open_water_site()
        };
        let result = calculator.calculate(&site);
        assert!(result.local_wind_speed.is_some());
        assert_eq!(result.wave_setup, None);
        assert_eq!(result.crest_elevation, None);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::InvalidInput);
    }
}
