//! Wave fetch: the open-water distance the wind blows over.
//!
//! Narrow water bodies use a fan of 13 rays around the wind direction; wide
//! water bodies use a closed form in the wind speed, capped by the limiting
//! fetch Dmax read from the wind-speed table.

use crate::diagnostics::Clamp;
use crate::error::{positive, CalcError, Result};
use crate::interpolation::interpolate;
use dyke_tables::LookupTable;
use dyke_utils::rays::{ray_cosines, RAY_COUNT};
use serde::{Deserialize, Serialize};

/// Kinematic viscosity ν, m²/s
pub const KINEMATIC_VISCOSITY: f64 = 1e-5;

/// Dimensional constant of the wide-water fetch formula
pub const WIDE_FETCH_CONSTANT: f64 = 5e11;

/// Weight applied to each ray length in the fan average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RayWeighting {
    /// De = Σ rᵢ·cos αᵢ / Σ cos αᵢ
    Cosine,
    /// De = Σ rᵢ·cos² αᵢ / Σ cos αᵢ
    CosineSquared,
}

/// Effective fetch of a ray fan with the sums it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NarrowFetch {
    pub numerator: f64,
    pub denominator: f64,
    /// De, in the unit of the rays. Zero means the fan carried no usable
    /// directional information.
    pub effective: f64,
}

/// Effective fetch of a standard 13-ray fan (-45° to +45°, step 7.5°).
pub fn narrow_fetch(rays: &[f64], weighting: RayWeighting) -> Result<NarrowFetch> {
    if rays.len() != RAY_COUNT {
        return Err(CalcError::MalformedRays {
            found: rays.len(),
            expected: RAY_COUNT,
        });
    }
    if let Some(bad) = rays.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(CalcError::NonPositive {
            name: "ray length",
            value: *bad,
        });
    }
    Ok(narrow_fetch_with_cosines(rays, &ray_cosines(), weighting))
}

/// Fan average from ray lengths and their precomputed cos αᵢ.
///
/// A zero Σ cos αᵢ gives De = 0 rather than a division by zero.
pub fn narrow_fetch_with_cosines(rays: &[f64], cosines: &[f64], weighting: RayWeighting) -> NarrowFetch {
    let numerator: f64 = rays
        .iter()
        .zip(cosines)
        .map(|(r, cos)| match weighting {
            RayWeighting::Cosine => r * cos,
            RayWeighting::CosineSquared => r * cos * cos,
        })
        .sum();
    let denominator: f64 = cosines.iter().take(rays.len()).sum();
    let effective = if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    };
    NarrowFetch {
        numerator,
        denominator,
        effective,
    }
}

/// Mean wide-water fetch D = (5·10¹¹·ν / w) / 1000, km.
///
/// `None` unless the wind speed is a positive number.
pub fn wide_fetch_km(wind_speed: f64) -> Option<f64> {
    if wind_speed > 0.0 && wind_speed.is_finite() {
        Some(WIDE_FETCH_CONSTANT * KINEMATIC_VISCOSITY / wind_speed / 1000.0)
    } else {
        None
    }
}

/// Wide-water fetch, with the limit it was capped by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WideFetch {
    pub computed_km: f64,
    pub limit_km: Option<f64>,
    /// min(computed, limit)
    pub effective_km: f64,
}

/// Wide-water fetch for `wind_speed`, capped by `limit_km` when known.
pub fn limited_wide_fetch(wind_speed: f64, limit_km: Option<f64>) -> Option<WideFetch> {
    let computed_km = wide_fetch_km(wind_speed)?;
    let effective_km = match limit_km {
        Some(limit) => computed_km.min(limit),
        None => computed_km,
    };
    Some(WideFetch {
        computed_km,
        limit_km,
        effective_km,
    })
}

/// Outcome of checking a fetch against the limiting fetch Dmax.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FetchCheck {
    pub fetch_km: f64,
    pub limit_km: f64,
    /// Set when the wind speed lay outside the Dmax table
    pub clamp: Option<Clamp>,
    /// fetch ≤ Dmax
    pub admissible: bool,
}

/// Check a computed fetch (km) against Dmax interpolated at `wind_speed`.
pub fn check_fetch(fetch_km: f64, wind_speed: f64, limits: &LookupTable) -> Result<FetchCheck> {
    let wind_speed = positive("wind speed", Some(wind_speed))?;
    if !fetch_km.is_finite() || fetch_km < 0.0 {
        return Err(CalcError::NonPositive {
            name: "fetch",
            value: fetch_km,
        });
    }
    let limit = interpolate(limits, wind_speed)?;
    Ok(FetchCheck {
        fetch_km,
        limit_km: limit.value,
        clamp: limit.clamp,
        admissible: fetch_km <= limit.value,
    })
}
