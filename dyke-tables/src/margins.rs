use crate::dyke_class::DykeClass;
use crate::error::{Result, TableError};
use csv::ReaderBuilder;
use dyke_utils::cells::parse_number;
use std::collections::BTreeMap;

/// Safety margin `a` (m) added to the crest, by dyke class.
///
/// Exact-match lookups: a class missing from the table is an error, never
/// an interpolated value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SafetyMargins {
    river: BTreeMap<DykeClass, f64>,
    sea: BTreeMap<DykeClass, f64>,
}

impl SafetyMargins {
    /// Parse a CSV with columns: class, river, sea. A blank cell means the
    /// class has no margin for that kind of dyke.
    pub fn parse_csv(csv_object: &str) -> Result<SafetyMargins> {
        let mut margins = SafetyMargins::default();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let class: DykeClass = record.get(0).unwrap_or_default().parse()?;
            for (column, target) in [(1, &mut margins.river), (2, &mut margins.sea)] {
                let cell = record.get(column).unwrap_or_default();
                let value = parse_number(cell).map_err(|e| TableError::InvalidTable {
                    name: "safety_margins".to_string(),
                    reason: e.to_string(),
                })?;
                if let Some(v) = value {
                    target.insert(class, v);
                }
            }
        }
        Ok(margins)
    }

    pub fn river(&self, class: DykeClass) -> Result<f64> {
        self.river
            .get(&class)
            .copied()
            .ok_or(TableError::MissingMargin { class, kind: "river" })
    }

    pub fn sea(&self, class: DykeClass) -> Result<f64> {
        self.sea
            .get(&class)
            .copied()
            .ok_or(TableError::MissingMargin { class, kind: "sea" })
    }
}
