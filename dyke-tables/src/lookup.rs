use crate::error::{Result, TableError};
use serde::Serialize;

/// An immutable (x, y) table with strictly increasing x.
///
/// Queried through interpolation; construction rejects tables with fewer
/// than two points, non-finite values or x values that are not strictly
/// increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupTable {
    name: String,
    points: Vec<(f64, f64)>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Result<Self> {
        let name = name.into();
        if points.len() < 2 {
            return Err(TableError::InvalidTable {
                name,
                reason: format!("needs at least 2 points, found {}", points.len()),
            });
        }
        if let Some((x, y)) = points.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(TableError::InvalidTable {
                name,
                reason: format!("non-finite point ({}, {})", x, y),
            });
        }
        if let Some(pair) = points.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
            return Err(TableError::InvalidTable {
                name,
                reason: format!(
                    "x values must be strictly increasing ({} then {})",
                    pair[0].0, pair[1].0
                ),
            });
        }
        Ok(LookupTable { name, points })
    }

    /// Build from parallel x and y columns.
    pub fn from_columns(name: impl Into<String>, xs: &[f64], ys: &[f64]) -> Result<Self> {
        let name = name.into();
        if xs.len() != ys.len() {
            return Err(TableError::InvalidTable {
                name,
                reason: format!("{} x values but {} y values", xs.len(), ys.len()),
            });
        }
        let points = xs.iter().copied().zip(ys.iter().copied()).collect();
        LookupTable::new(name, points)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Smallest and largest x
    pub fn domain(&self) -> (f64, f64) {
        (self.points[0].0, self.points[self.points.len() - 1].0)
    }

    /// Multiply every y by `factor`, e.g. to undo a ×10⁻⁶ column scaling.
    pub fn scale_values(mut self, factor: f64) -> Self {
        for point in self.points.iter_mut() {
            point.1 *= factor;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table() {
        let table = LookupTable::from_columns("kw", &[20.0, 30.0, 40.0], &[2.1, 3.0, 3.9]).unwrap();
        assert_eq!(table.name(), "kw");
        assert_eq!(table.domain(), (20.0, 40.0));
        assert_eq!(table.points().len(), 3);
    }

    #[test]
    fn test_rejects_short_table() {
        let err = LookupTable::new("short", vec![(1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, TableError::InvalidTable { .. }));
    }

    #[test]
    fn test_rejects_non_increasing_x() {
        assert!(LookupTable::new("dup", vec![(1.0, 1.0), (1.0, 2.0)]).is_err());
        assert!(LookupTable::new("down", vec![(2.0, 1.0), (1.0, 2.0)]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_columns() {
        assert!(LookupTable::from_columns("bad", &[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_scale_values() {
        let table = LookupTable::from_columns("kw", &[20.0, 30.0], &[2.1, 3.0])
            .unwrap()
            .scale_values(1e-6);
        assert!((table.points()[0].1 - 2.1e-6).abs() < 1e-18);
    }
}
