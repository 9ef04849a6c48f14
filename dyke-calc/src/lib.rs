//! Hydraulic calculators for dyke crest elevations.
//!
//! River dykes are designed against wind-driven wave setup; sea dykes against
//! wave run-up (no overtopping) and against an allowable overtopping
//! discharge. Every calculator works on one site record at a time, never
//! mutates its input, and reports problems as [`diagnostics::Diagnostic`]s
//! on the row instead of failing the batch.

pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod interpolation;
pub mod river;
pub mod sea;
pub mod settings;
pub mod solver;
pub mod workflow;

pub use diagnostics::{Clamp, Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{CalcError, Result};
pub use river::{FetchInput, RiverCalculator, RiverResult, RiverSite};
pub use sea::{SeaCalculator, SeaResult, SeaSite};
pub use settings::CalcSettings;
pub use workflow::{DykeCalculator, Evaluated, Workflow};

/// Gravitational acceleration, m/s²
pub const GRAVITY: f64 = 9.81;
