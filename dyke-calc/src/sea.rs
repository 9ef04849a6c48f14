//! Sea dyke crest against wave run-up and wave overtopping.
//!
//! Two crests are designed for each line:
//!
//! - no overtopping: Zdb = Ztkp + Rslp + a + b, with Rslp the 2 % run-up;
//! - allowable overtopping: Zdb_tran = Ztkp + Rcp + a + b, with Rcp the
//!   freeboard at which the mean overtopping discharge meets the allowed q.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{defined, positive, CalcError, Result};
use crate::settings::{CalcSettings, RoughnessCorrection};
use crate::solver::{iterate, Step};
use crate::GRAVITY;
use dyke_tables::{DykeClass, Tables};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Bounds of the freeboard search, as multiples of Hsp
pub const FREEBOARD_BOUNDS: (f64, f64) = (0.1, 5.0);

/// One sea dyke line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeaSite {
    pub line: String,
    pub class: String,
    /// Hsp, design significant wave height at the toe, m
    pub wave_height: Option<f64>,
    /// Tp, spectral peak period, s
    pub peak_period: Option<f64>,
    /// α in Tm-1,0 = Tp/α
    pub spectral_shape: Option<f64>,
    /// m of the 1:m slope
    pub slope: Option<f64>,
    /// B, m
    pub berm_width: Option<f64>,
    /// Lb, m
    pub berm_wavelength: Option<f64>,
    /// β, wave obliquity to the shore normal, degrees
    pub wave_angle: Option<f64>,
    /// αw, wind obliquity to the shore normal, degrees
    pub wind_angle: Option<f64>,
    /// [q], l/s per m
    pub allowed_discharge: Option<f64>,
    pub material: Option<String>,
    /// Ztkp, m
    pub design_water_level: Option<f64>,
    /// b, m
    pub freeboard: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BermStatus {
    NoBerm,
    Berm,
}

impl fmt::Display for BermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BermStatus::NoBerm => f.write_str("no berm"),
            BermStatus::Berm => f.write_str("berm"),
        }
    }
}

/// Wave state on the slope for the run-up formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakingState {
    Broken,
    Unbroken,
}

impl fmt::Display for BreakingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakingState::Broken => f.write_str("broken waves"),
            BreakingState::Unbroken => f.write_str("unbroken waves"),
        }
    }
}

/// Overtopping formula branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OvertoppingRegime {
    /// ξ_o > 7
    Breaking,
    /// γ_b·ξ_o ≤ 2
    NonBreaking,
    /// high-freeboard deterministic form
    Deterministic,
}

impl fmt::Display for OvertoppingRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OvertoppingRegime::Breaking => f.write_str("breaking"),
            OvertoppingRegime::NonBreaking => f.write_str("non-breaking"),
            OvertoppingRegime::Deterministic => f.write_str("deterministic"),
        }
    }
}

/// Spectral period Tm-1,0 = Tp/α and wave steepness s0 = 2π·Hsp/(g·Tm²).
pub fn wave_parameters(wave_height: f64, peak_period: f64, spectral_shape: f64) -> Result<(f64, f64)> {
    let hsp = positive("Hsp", Some(wave_height))?;
    let tp = positive("Tp", Some(peak_period))?;
    let alpha = positive("α", Some(spectral_shape))?;
    let period = tp / alpha;
    let steepness = 2.0 * PI * hsp / (GRAVITY * period.powi(2));
    Ok((period, steepness))
}

/// tan(α) = 1/m of a 1:m slope.
pub fn slope_tangent(slope: f64) -> Result<f64> {
    Ok(1.0 / positive("m", Some(slope))?)
}

/// Breaking index ξ = tan(α)/√s0; zero for non-positive steepness.
pub fn breaking_index(tan_alpha: f64, steepness: f64) -> f64 {
    if steepness > 0.0 {
        tan_alpha / steepness.sqrt()
    } else {
        0.0
    }
}

/// Berm factor γ_b = clamp(1 - B/Lb, 0.6, 1.0); 1.0 without a berm.
pub fn berm_factor(width: Option<f64>, wavelength: Option<f64>) -> (f64, BermStatus) {
    match (width, wavelength) {
        (Some(b), Some(lb)) if b > 0.0 && lb > 0.0 => {
            ((1.0 - b / lb).clamp(0.6, 1.0), BermStatus::Berm)
        }
        _ => (1.0, BermStatus::NoBerm),
    }
}

/// Obliquity factor γ_β for run-up.
pub fn runup_obliquity(wave_angle: f64) -> f64 {
    1.0 - 0.0022 * wave_angle.abs().min(80.0)
}

/// Obliquity factor γ_β for overtopping.
pub fn overtopping_obliquity(wave_angle: f64) -> f64 {
    1.0 - 0.0033 * wave_angle.abs().min(80.0)
}

/// Wind obliquity factor γ_v: 1.0 at 45°, 0.65 at 90°, linear in between.
pub fn wind_obliquity(wind_angle: f64) -> Result<f64> {
    if wind_angle == 90.0 {
        Ok(0.65)
    } else if wind_angle == 45.0 {
        Ok(1.0)
    } else if wind_angle > 45.0 && wind_angle < 90.0 {
        Ok(1.35 - 0.0078 * wind_angle)
    } else {
        Err(CalcError::NotApplicable {
            formula: "wind obliquity γ_v",
            reason: format!("αw = {}° outside [45°, 90°]", wind_angle),
        })
    }
}

/// Corrected roughness γ_f* for a freeboard ratio Rcp/Hsp.
///
/// Returns (γ_f*, Rcp/Hsp).
pub fn corrected_roughness(gamma_f: f64, freeboard: f64, wave_height: f64) -> Result<(f64, f64)> {
    let hsp = positive("Hsp", Some(wave_height))?;
    let ratio = freeboard / hsp;
    let corrected = if gamma_f < 0.90 {
        if ratio >= 0.5 {
            gamma_f - 0.05
        } else {
            gamma_f
        }
    } else if ratio > 1.0 {
        gamma_f - 0.3
    } else if ratio <= 0.5 {
        gamma_f
    } else {
        gamma_f - 0.6 * (ratio - 0.5)
    };
    Ok((corrected, ratio))
}

/// 2 % run-up height Rslp, m.
pub fn run_up(
    wave_height: f64,
    xi: f64,
    gamma_beta: f64,
    gamma_b: f64,
    gamma_f: f64,
) -> Result<(f64, BreakingState)> {
    let condition = gamma_b * xi;
    if condition > 0.5 && condition < 1.8 {
        Ok((
            1.75 * gamma_beta * gamma_b * gamma_f * xi * wave_height,
            BreakingState::Broken,
        ))
    } else if (1.8..10.0).contains(&condition) {
        Ok((
            gamma_beta * gamma_f * gamma_b * (4.3 - 1.6 / xi.sqrt()) * wave_height,
            BreakingState::Unbroken,
        ))
    } else {
        Err(CalcError::NotApplicable {
            formula: "run-up",
            reason: format!("γ_b·ξ_p = {:.3} outside (0.5, 10.0)", condition),
        })
    }
}

/// Slope and wave quantities the overtopping discharge depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OvertoppingParams {
    pub wave_height: f64,
    pub tan_alpha: f64,
    /// ξ_o
    pub xi: f64,
    pub gamma_b: f64,
    pub gamma_beta: f64,
    /// Only needed by the non-breaking branch
    pub gamma_v: Option<f64>,
}

impl OvertoppingParams {
    pub fn regime(&self) -> OvertoppingRegime {
        if self.xi > 7.0 {
            OvertoppingRegime::Breaking
        } else if self.gamma_b * self.xi <= 2.0 {
            OvertoppingRegime::NonBreaking
        } else {
            OvertoppingRegime::Deterministic
        }
    }
}

/// Mean overtopping discharge at freeboard `freeboard`, l/s per m.
pub fn overtopping_discharge(
    freeboard: f64,
    params: &OvertoppingParams,
    gamma_f_star: f64,
) -> Result<(f64, OvertoppingRegime)> {
    let rcp = positive("Rcp", Some(freeboard))?;
    let hsp = positive("Hsp", Some(params.wave_height))?;
    let tan_alpha = positive("tan(α)", Some(params.tan_alpha))?;
    let xi = params.xi;
    let regime = params.regime();
    let normalized = match regime {
        OvertoppingRegime::Breaking => {
            0.21 * (-rcp / (gamma_f_star * params.gamma_beta * hsp * (0.33 + 0.022 * xi))).exp()
        }
        OvertoppingRegime::NonBreaking => {
            let gamma_v = params.gamma_v.ok_or(CalcError::Undefined("γ_v"))?;
            (0.067 / tan_alpha.sqrt())
                * params.gamma_b
                * xi
                * (-4.3 * rcp
                    / (hsp * xi * params.gamma_b * gamma_f_star * params.gamma_beta * gamma_v))
                    .exp()
        }
        OvertoppingRegime::Deterministic => {
            0.2 * (-2.3 * rcp / (hsp * gamma_f_star * params.gamma_beta)).exp()
        }
    };
    let discharge = normalized * (GRAVITY * hsp.powi(3)).sqrt() * 1000.0;
    if discharge.is_finite() {
        Ok((discharge, regime))
    } else {
        Err(CalcError::NotApplicable {
            formula: "overtopping discharge",
            reason: format!("q is not finite at Rcp = {}", rcp),
        })
    }
}

/// How γ_f* is supplied to the freeboard solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoughnessInput {
    /// γ_f* evaluated once beforehand
    Fixed(f64),
    /// γ_f* recomputed from the current Rcp, starting from this base γ_f
    PerIteration { gamma_f: f64 },
}

/// Freeboard found by the overtopping solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FreeboardSolution {
    pub freeboard: f64,
    /// Freeboard the last discharge and γ_f* were evaluated at; differs from
    /// `freeboard` only without convergence
    pub evaluated_freeboard: f64,
    /// Discharge at the last evaluated freeboard, l/s per m
    pub discharge: f64,
    pub regime: OvertoppingRegime,
    /// γ_f* at the last evaluated freeboard
    pub gamma_f_star: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Search the freeboard Rcp whose discharge matches `target` (l/s per m).
///
/// Starts at 0.5·Hsp and scales Rcp by ±10 % for the first five steps and
/// ±5 % afterwards, kept inside [0.1, 5.0]·Hsp. A step is accepted when the
/// discharge is within `tolerance_fraction` of the target.
pub fn solve_freeboard(
    params: &OvertoppingParams,
    roughness: RoughnessInput,
    target: f64,
    tolerance_fraction: f64,
    max_iterations: usize,
) -> Result<FreeboardSolution> {
    let hsp = positive("Hsp", Some(params.wave_height))?;
    let target = defined("[q]", Some(target))?;
    let tolerance = tolerance_fraction * target;
    let (low, high) = (FREEBOARD_BOUNDS.0 * hsp, FREEBOARD_BOUNDS.1 * hsp);

    let mut last = None;
    let solution = iterate(0.5 * hsp, max_iterations, |iteration, rcp| {
        let gamma_f_star = match roughness {
            RoughnessInput::Fixed(gamma_f_star) => gamma_f_star,
            RoughnessInput::PerIteration { gamma_f } => corrected_roughness(gamma_f, rcp, hsp)?.0,
        };
        let (discharge, regime) = overtopping_discharge(rcp, params, gamma_f_star)?;
        last = Some((rcp, discharge, regime, gamma_f_star));
        if (discharge - target).abs() <= tolerance {
            return Ok(Step::Converged(rcp));
        }
        let adjustment = if iteration <= 5 { 0.1 } else { 0.05 };
        let next = if discharge > target {
            rcp * (1.0 + adjustment)
        } else {
            rcp * (1.0 - adjustment)
        };
        Ok(Step::Continue(next.clamp(low, high)))
    })?;

    let (evaluated_freeboard, discharge, regime, gamma_f_star) =
        last.ok_or(CalcError::Undefined("Rcp"))?;
    Ok(FreeboardSolution {
        freeboard: solution.value,
        evaluated_freeboard,
        discharge,
        regime,
        gamma_f_star,
        iterations: solution.iterations,
        converged: solution.converged,
    })
}

/// Intermediate and final values for one sea site.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeaResult {
    pub line: String,
    /// a, m
    pub safety_margin: Option<f64>,
    pub berm_status: Option<BermStatus>,
    /// Tm-1,0, s
    pub spectral_period: Option<f64>,
    /// s0
    pub steepness: Option<f64>,
    pub tan_alpha: Option<f64>,
    pub gamma_b: Option<f64>,
    pub gamma_f: Option<f64>,
    /// ξ_p
    pub xi_runup: Option<f64>,
    pub gamma_beta_runup: Option<f64>,
    pub breaking_state: Option<BreakingState>,
    /// Rslp, m
    pub run_up: Option<f64>,
    /// Zdb, m
    pub crest_no_overtopping: Option<f64>,
    /// [q], l/s per m
    pub allowed_discharge: Option<f64>,
    /// ξ_o
    pub xi_overtopping: Option<f64>,
    pub gamma_beta_overtopping: Option<f64>,
    pub gamma_v: Option<f64>,
    /// Rcp/Hsp used for γ_f*
    pub freeboard_ratio: Option<f64>,
    pub gamma_f_star: Option<f64>,
    /// Rcp, m
    pub freeboard: Option<f64>,
    pub overtopping_regime: Option<OvertoppingRegime>,
    /// q at the final Rcp, l/s per m
    pub discharge: Option<f64>,
    pub freeboard_iterations: Option<usize>,
    pub freeboard_converged: Option<bool>,
    /// Zdb_tran, m
    pub crest_overtopping: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Calculator for sea dyke lines.
pub struct SeaCalculator<'a> {
    tables: &'a Tables,
    settings: &'a CalcSettings,
}

impl<'a> SeaCalculator<'a> {
    pub fn new(tables: &'a Tables, settings: &'a CalcSettings) -> Self {
        SeaCalculator { tables, settings }
    }

    /// γ_f for a revetment material; unlisted or blank materials get 1.0.
    pub fn material_roughness(&self, material: Option<&str>, diagnostics: &mut Diagnostics) -> f64 {
        match material.map(str::trim).filter(|m| !m.is_empty()) {
            Some(material) => self.tables.roughness.gamma_f(material).unwrap_or(1.0),
            None => {
                diagnostics.note(
                    DiagnosticKind::Substituted,
                    "γ_f",
                    "revetment material missing; γ_f = 1.0 used",
                );
                1.0
            }
        }
    }

    pub fn calculate(&self, site: &SeaSite) -> SeaResult {
        let mut diagnostics = Diagnostics::for_row(site.line.clone());
        let mut result = SeaResult {
            line: site.line.clone(),
            allowed_discharge: site.allowed_discharge,
            ..SeaResult::default()
        };

        result.safety_margin = diagnostics.take(
            "a",
            site.class
                .parse::<DykeClass>()
                .and_then(|class| self.tables.margins.sea(class))
                .map_err(CalcError::from),
        );

        let (gamma_b, berm_status) = berm_factor(site.berm_width, site.berm_wavelength);
        result.gamma_b = Some(gamma_b);
        result.berm_status = Some(berm_status);
        let gamma_f = self.material_roughness(site.material.as_deref(), &mut diagnostics);
        result.gamma_f = Some(gamma_f);

        let wave_angle = diagnostics.take("β", defined("β", site.wave_angle));
        result.gamma_beta_runup = wave_angle.map(runup_obliquity);
        result.gamma_beta_overtopping = wave_angle.map(overtopping_obliquity);
        result.gamma_v = site
            .wind_angle
            .and_then(|angle| diagnostics.take("γ_v", wind_obliquity(angle)));

        let wave = diagnostics.take(
            "s0",
            defined("Hsp", site.wave_height).and_then(|hsp| {
                let tp = defined("Tp", site.peak_period)?;
                let alpha = defined("α", site.spectral_shape)?;
                Ok((hsp, wave_parameters(hsp, tp, alpha)?))
            }),
        );
        if let Some((_, (period, steepness))) = wave {
            result.spectral_period = Some(period);
            result.steepness = Some(steepness);
        }
        result.tan_alpha = diagnostics.take("tan(α)", defined("m", site.slope).and_then(slope_tangent));

        let hsp = wave.map(|(hsp, _)| hsp);
        if let (Some(hsp), Some(steepness), Some(tan_alpha)) = (hsp, result.steepness, result.tan_alpha) {
            let xi = breaking_index(tan_alpha, steepness);
            result.xi_runup = Some(xi);
            result.xi_overtopping = Some(xi);

            // without β neither obliquity factor exists, so Rslp and Rcp stay undefined
            if let (Some(gamma_beta), Some(gamma_beta_overtopping)) =
                (result.gamma_beta_runup, result.gamma_beta_overtopping)
            {
                if let Some((rslp, state)) =
                    diagnostics.take("Rslp", run_up(hsp, xi, gamma_beta, gamma_b, gamma_f))
                {
                    result.run_up = Some(rslp);
                    result.breaking_state = Some(state);
                }

                let params = OvertoppingParams {
                    wave_height: hsp,
                    tan_alpha,
                    xi,
                    gamma_b,
                    gamma_beta: gamma_beta_overtopping,
                    gamma_v: result.gamma_v,
                };
                self.solve_overtopping(site, &params, gamma_f, &mut result, &mut diagnostics);
            }
        }

        let water_level = diagnostics.take("Ztkp", defined("Ztkp", site.design_water_level));
        let freeboard = diagnostics.take("b", defined("b", site.freeboard));
        if let (Some(ztkp), Some(margin), Some(b)) = (water_level, result.safety_margin, freeboard) {
            result.crest_no_overtopping = result.run_up.map(|rslp| ztkp + rslp + margin + b);
            result.crest_overtopping = result.freeboard.map(|rcp| ztkp + rcp + margin + b);
        }

        result.diagnostics = diagnostics.into_vec();
        result
    }

    fn solve_overtopping(
        &self,
        site: &SeaSite,
        params: &OvertoppingParams,
        gamma_f: f64,
        result: &mut SeaResult,
        diagnostics: &mut Diagnostics,
    ) {
        let hsp = params.wave_height;
        let roughness = match self.settings.roughness_correction {
            RoughnessCorrection::Provisional { rcp } => {
                match diagnostics.take("γ_f*", corrected_roughness(gamma_f, rcp, hsp)) {
                    Some((gamma_f_star, ratio)) => {
                        result.gamma_f_star = Some(gamma_f_star);
                        result.freeboard_ratio = Some(ratio);
                        RoughnessInput::Fixed(gamma_f_star)
                    }
                    None => return,
                }
            }
            RoughnessCorrection::Iterative => RoughnessInput::PerIteration { gamma_f },
        };

        let target = match diagnostics.take("[q]", defined("[q]", site.allowed_discharge)) {
            Some(target) => target,
            None => return,
        };
        let solved = solve_freeboard(
            params,
            roughness,
            target,
            self.settings.overtopping_tolerance_fraction,
            self.settings.max_iterations,
        );
        let Some(solution) = diagnostics.take("Rcp", solved) else {
            return;
        };
        if !solution.converged {
            diagnostics.note(
                DiagnosticKind::NonConvergence,
                "Rcp",
                format!(
                    "no convergence after {} iterations, last iterate {:.4} m kept (q = {:.4} l/s/m)",
                    solution.iterations, solution.freeboard, solution.discharge
                ),
            );
        }
        if let RoughnessInput::PerIteration { .. } = roughness {
            result.gamma_f_star = Some(solution.gamma_f_star);
            result.freeboard_ratio = Some(solution.evaluated_freeboard / hsp);
        }
        result.freeboard = Some(solution.freeboard);
        result.discharge = Some(solution.discharge);
        result.overtopping_regime = Some(solution.regime);
        result.freeboard_iterations = Some(solution.iterations);
        result.freeboard_converged = Some(solution.converged);
    }
}
