//! Non-fatal findings attached to a calculated row.

use crate::error::{CalcError, Result};
use log::warn;
use serde::Serialize;
use std::fmt;

/// Which end of a lookup table a query was clamped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Clamp {
    Low,
    High,
}

impl fmt::Display for Clamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clamp::Low => f.write_str("clamped low"),
            Clamp::High => f.write_str("clamped high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Missing, non-positive or unrecognised input; the field is undefined
    InvalidInput,
    /// Lookup query outside the table domain, boundary value used
    OutOfRange(Clamp),
    /// Iteration cap reached, last iterate kept
    NonConvergence,
    /// Iteration denominator collapsed, field undefined
    Singular,
    /// Formula used outside its range of validity, field undefined
    NotApplicable,
    /// A documented default replaced a malformed input
    Substituted,
}

impl DiagnosticKind {
    /// True when the affected field carries no value.
    pub fn leaves_undefined(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::InvalidInput | DiagnosticKind::Singular | DiagnosticKind::NotApplicable
        )
    }
}

/// A finding about one field of one row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub field: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, field: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            field,
            message: message.into(),
        }
    }

    /// Classify a calculation error against the field it left undefined.
    pub fn from_error(field: &'static str, err: &CalcError) -> Self {
        let kind = match err {
            CalcError::Singular { .. } => DiagnosticKind::Singular,
            CalcError::NotApplicable { .. } => DiagnosticKind::NotApplicable,
            _ => DiagnosticKind::InvalidInput,
        };
        Diagnostic::new(kind, field, err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Diagnostics collected while calculating one row.
///
/// Every pushed diagnostic is also logged at `warn` level, tagged with the
/// row it belongs to.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    row: String,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn for_row(row: impl Into<String>) -> Self {
        Diagnostics {
            row: row.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("[{}] {}", self.row, diagnostic);
        self.items.push(diagnostic);
    }

    pub fn note(&mut self, kind: DiagnosticKind, field: &'static str, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, field, message));
    }

    /// Keep the value of a fallible step, or record why `field` is undefined.
    pub fn take<T>(&mut self, field: &'static str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(Diagnostic::from_error(field, &err));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Join diagnostics into a single human-readable cell.
pub fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
