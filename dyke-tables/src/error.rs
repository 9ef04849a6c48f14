/// Error types for the reference tables
use crate::dyke_class::DykeClass;
use thiserror::Error;

/// Errors raised while loading or querying reference tables
#[derive(Error, Debug)]
pub enum TableError {
    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to read a table file
    #[error("Failed to read table file: {0}")]
    Io(#[from] std::io::Error),

    /// A table violates its shape rules
    #[error("Invalid table '{name}': {reason}")]
    InvalidTable { name: String, reason: String },

    /// Dyke class key not recognised
    #[error("Unknown dyke class: '{0}'")]
    UnknownClass(String),

    /// Terrain category key not recognised
    #[error("Unknown terrain category: '{0}'")]
    UnknownTerrain(String),

    /// The class has no design wind speed in the standard
    #[error("No design wind speed defined for dyke class {0}")]
    NoDesignWind(DykeClass),

    /// The class has no safety margin for this kind of dyke
    #[error("No {kind} dyke safety margin for class {class}")]
    MissingMargin { class: DykeClass, kind: &'static str },
}

/// Type alias for Results using TableError
pub type Result<T> = std::result::Result<T, TableError>;
