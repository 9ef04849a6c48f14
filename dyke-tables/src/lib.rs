//! Reference data for dyke crest design.
//!
//! The numeric tables are embedded from `fixtures/` at compile time and can
//! be swapped for a directory of CSV files with the same names.

pub mod dyke_class;
pub mod error;
pub mod lookup;
pub mod margins;
pub mod roughness;
pub mod tables;
pub mod terrain;

pub use dyke_class::{DesignWind, DykeClass};
pub use error::{Result, TableError};
pub use lookup::LookupTable;
pub use tables::Tables;
pub use terrain::Terrain;
