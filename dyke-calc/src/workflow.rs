//! Batch evaluation of dyke lines.

use crate::diagnostics::Diagnostic;
use crate::river::{RiverCalculator, RiverResult, RiverSite};
use crate::sea::{SeaCalculator, SeaResult, SeaSite};
use crate::settings::CalcSettings;
use dyke_tables::Tables;
use log::info;
use serde::Serialize;

/// A calculator that turns one site record into one result row.
pub trait DykeCalculator {
    type Site;
    type Output;

    fn calculate(&self, site: &Self::Site) -> Self::Output;
}

impl DykeCalculator for RiverCalculator<'_> {
    type Site = RiverSite;
    type Output = RiverResult;

    fn calculate(&self, site: &RiverSite) -> RiverResult {
        RiverCalculator::calculate(self, site)
    }
}

impl DykeCalculator for SeaCalculator<'_> {
    type Site = SeaSite;
    type Output = SeaResult;

    fn calculate(&self, site: &SeaSite) -> SeaResult {
        SeaCalculator::calculate(self, site)
    }
}

/// An input record next to what was calculated from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluated<S, R> {
    pub site: S,
    pub result: R,
}

/// Runs whole tables of sites through a calculator, one row per site in
/// input order. A row with problems carries diagnostics; it never stops the
/// batch.
pub struct Workflow<'a> {
    tables: &'a Tables,
    settings: &'a CalcSettings,
}

impl<'a> Workflow<'a> {
    pub fn new(tables: &'a Tables, settings: &'a CalcSettings) -> Self {
        Workflow { tables, settings }
    }

    pub fn run_river(&self, sites: Vec<RiverSite>) -> Vec<Evaluated<RiverSite, RiverResult>> {
        let calculator = RiverCalculator::new(self.tables, self.settings);
        let rows = evaluate(&calculator, sites);
        info!(
            "River dykes: {} lines, {} with a crest elevation, {} with undefined fields",
            rows.len(),
            rows.iter().filter(|r| r.result.crest_elevation.is_some()).count(),
            rows.iter()
                .filter(|r| has_undefined_field(&r.result.diagnostics))
                .count()
        );
        rows
    }

    pub fn run_sea(&self, sites: Vec<SeaSite>) -> Vec<Evaluated<SeaSite, SeaResult>> {
        let calculator = SeaCalculator::new(self.tables, self.settings);
        let rows = evaluate(&calculator, sites);
        info!(
            "Sea dykes: {} lines, {} with Zdb, {} with Zdb_tran, {} with undefined fields",
            rows.len(),
            rows.iter()
                .filter(|r| r.result.crest_no_overtopping.is_some())
                .count(),
            rows.iter()
                .filter(|r| r.result.crest_overtopping.is_some())
                .count(),
            rows.iter()
                .filter(|r| has_undefined_field(&r.result.diagnostics))
                .count()
        );
        rows
    }
}

/// True when some diagnostic of a row left its field without a value.
pub fn has_undefined_field(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.kind.leaves_undefined())
}

/// Apply `calculator` to every site, keeping input order.
pub fn evaluate<C: DykeCalculator>(calculator: &C, sites: Vec<C::Site>) -> Vec<Evaluated<C::Site, C::Output>> {
    sites
        .into_iter()
        .map(|site| {
            let result = calculator.calculate(&site);
            Evaluated { site, result }
        })
        .collect()
}
