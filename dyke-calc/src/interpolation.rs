//! Piecewise-linear table interpolation with boundary clamping.

use crate::diagnostics::{Clamp, DiagnosticKind, Diagnostics};
use crate::error::{CalcError, Result};
use dyke_tables::LookupTable;

/// An interpolated value, flagged when the query fell outside the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolated {
    pub value: f64,
    pub clamp: Option<Clamp>,
}

impl Interpolated {
    pub fn exact(value: f64) -> Self {
        Interpolated { value, clamp: None }
    }
}

/// Interpolate `x` in a validated table.
///
/// Outside the domain the boundary y of the nearest end is returned and the
/// result is flagged; there is no linear extrapolation.
pub fn interpolate(table: &LookupTable, x: f64) -> Result<Interpolated> {
    interpolate_points(table.points(), x)
}

/// Interpolate `x` in raw (x, y) pairs, validating the pairs first.
pub fn interpolate_points(points: &[(f64, f64)], x: f64) -> Result<Interpolated> {
    if points.len() < 2 {
        return Err(CalcError::InvalidTable(format!(
            "needs at least 2 points, found {}",
            points.len()
        )));
    }
    if points.windows(2).any(|pair| !(pair[1].0 > pair[0].0)) {
        return Err(CalcError::InvalidTable(
            "x values must be strictly increasing".to_string(),
        ));
    }
    if !x.is_finite() {
        return Err(CalcError::Undefined("interpolation query"));
    }

    let (first_x, first_y) = points[0];
    let (last_x, last_y) = points[points.len() - 1];
    if x < first_x {
        return Ok(Interpolated {
            value: first_y,
            clamp: Some(Clamp::Low),
        });
    }
    if x > last_x {
        return Ok(Interpolated {
            value: last_y,
            clamp: Some(Clamp::High),
        });
    }
    if x == last_x {
        return Ok(Interpolated::exact(last_y));
    }

    // first index with px > x; always in 1..len since first_x <= x < last_x
    let upper = points.partition_point(|(px, _)| *px <= x);
    let (x0, y0) = points[upper - 1];
    if x == x0 {
        return Ok(Interpolated::exact(y0));
    }
    let (x1, y1) = points[upper];
    Ok(Interpolated::exact(y0 + (y1 - y0) * (x - x0) / (x1 - x0)))
}

impl Diagnostics {
    /// Interpolate `x` in `table`, noting any clamp against `field`.
    pub fn lookup(&mut self, field: &'static str, table: &LookupTable, x: f64) -> Option<f64> {
        let interpolated = self.take(field, interpolate(table, x))?;
        if let Some(clamp) = interpolated.clamp {
            let (low, high) = table.domain();
            self.note(
                DiagnosticKind::OutOfRange(clamp),
                field,
                format!(
                    "{} query {:.2} outside [{}, {}], {} to {}",
                    table.name(),
                    x,
                    low,
                    high,
                    clamp,
                    interpolated.value
                ),
            );
        }
        Some(interpolated.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw_table() -> LookupTable {
        LookupTable::from_columns("Kw", &[20.0, 30.0, 40.0, 50.0], &[2.1, 3.0, 3.9, 4.8]).unwrap()
    }

    #[test]
    fn test_exact_table_points() {
        let table = kw_table();
        for (x, y) in table.points() {
            let result = interpolate(&table, *x).unwrap();
            assert_eq!(result.value, *y);
            assert_eq!(result.clamp, None);
        }
    }

    #[test]
    fn test_linear_between_points() {
        let result = interpolate(&kw_table(), 26.775).unwrap();
        assert!((result.value - 2.70975).abs() < 1e-12);
        assert_eq!(result.clamp, None);
    }

    #[test]
    fn test_clamps_beyond_max() {
        let result = interpolate(&kw_table(), 70.0).unwrap();
        assert_eq!(result.value, 4.8);
        assert_eq!(result.clamp, Some(Clamp::High));
    }

    #[test]
    fn test_clamps_below_min() {
        let result = interpolate(&kw_table(), 5.0).unwrap();
        assert_eq!(result.value, 2.1);
        assert_eq!(result.clamp, Some(Clamp::Low));
    }

    #[test]
    fn test_invalid_points() {
        assert!(matches!(
            interpolate_points(&[(1.0, 1.0)], 1.0),
            Err(CalcError::InvalidTable(_))
        ));
        assert!(matches!(
            interpolate_points(&[(1.0, 1.0), (1.0, 2.0)], 1.0),
            Err(CalcError::InvalidTable(_))
        ));
        assert!(matches!(
            interpolate_points(&[(2.0, 1.0), (1.0, 2.0)], 1.5),
            Err(CalcError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_nan_query() {
        assert!(matches!(
            interpolate(&kw_table(), f64::NAN),
            Err(CalcError::Undefined(_))
        ));
    }

    #[test]
    fn test_lookup_notes_clamp() {
        let mut diagnostics = Diagnostics::for_row("test");
        let value = diagnostics.lookup("Kw", &kw_table(), 55.0);
        assert_eq!(value, Some(4.8));
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::OutOfRange(Clamp::High));
        assert!(diagnostic.message.contains("clamped high"));
    }
}
