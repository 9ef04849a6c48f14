/// Error types for the dyke calculators
use dyke_tables::TableError;
use thiserror::Error;

/// A failure that leaves one calculated field undefined.
///
/// Never fatal to a batch: calculators turn these into diagnostics on the
/// affected row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// A quantity that must be strictly positive is not
    #[error("{name} = {value} is not valid (must be > 0)")]
    NonPositive { name: &'static str, value: f64 },

    /// A required quantity is missing or not a number
    #[error("{0} is undefined")]
    Undefined(&'static str),

    /// Reference table lookup failed (unknown key, missing entry)
    #[error("{0}")]
    Table(String),

    /// A lookup table has the wrong shape
    #[error("Invalid lookup table: {0}")]
    InvalidTable(String),

    /// Ray fan without the expected number of rays
    #[error("Ray fan has {found} values, expected {expected}")]
    MalformedRays { found: usize, expected: usize },

    /// Iteration denominator collapsed to zero
    #[error("Singular denominator at iteration {iteration}")]
    Singular { iteration: usize },

    /// Inputs lie outside the range a formula is defined for
    #[error("{formula} not applicable: {reason}")]
    NotApplicable { formula: &'static str, reason: String },
}

impl From<TableError> for CalcError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::InvalidTable { .. } => CalcError::InvalidTable(err.to_string()),
            other => CalcError::Table(other.to_string()),
        }
    }
}

/// Type alias for Results using CalcError
pub type Result<T> = std::result::Result<T, CalcError>;

/// Require a present, finite, strictly positive value.
pub fn positive(name: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_nan() => Err(CalcError::Undefined(name)),
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        Some(v) => Err(CalcError::NonPositive { name, value: v }),
        None => Err(CalcError::Undefined(name)),
    }
}

/// Require a present, finite value.
pub fn defined(name: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(CalcError::Undefined(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive() {
        assert_eq!(positive("d", Some(5.0)), Ok(5.0));
        assert_eq!(
            positive("d", Some(0.0)),
            Err(CalcError::NonPositive { name: "d", value: 0.0 })
        );
        assert_eq!(positive("d", None), Err(CalcError::Undefined("d")));
        assert_eq!(positive("d", Some(f64::NAN)), Err(CalcError::Undefined("d")));
    }

    #[test]
    fn test_defined() {
        assert_eq!(defined("aw", Some(-10.0)), Ok(-10.0));
        assert_eq!(defined("aw", Some(f64::INFINITY)), Err(CalcError::Undefined("aw")));
    }

    #[test]
    fn test_table_error_conversion() {
        let err: CalcError = TableError::UnknownTerrain("Rừng".to_string()).into();
        assert!(matches!(err, CalcError::Table(_)));
        assert!(err.to_string().contains("Rừng"));
    }
}
