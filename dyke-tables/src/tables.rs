use crate::error::{Result, TableError};
use crate::lookup::LookupTable;
use crate::margins::SafetyMargins;
use crate::roughness::RoughnessTable;
use crate::terrain::Terrain;
use csv::ReaderBuilder;
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Embedded Kw table: wind speed (m/s) against Kw × 10⁶.
pub static KW_CSV: &str = include_str!("../../fixtures/kw.csv");

/// Embedded kl table: wind speed (m/s) against kl for rough terrains A, B, C.
pub static KL_CSV: &str = include_str!("../../fixtures/kl.csv");

/// Embedded limiting fetch table: wind speed (m/s) against Dmax/Lu (km).
pub static LIMITING_FETCH_CSV: &str = include_str!("../../fixtures/limiting_fetch.csv");

/// Embedded safety margins by dyke class, river and sea.
pub static SAFETY_MARGINS_CSV: &str = include_str!("../../fixtures/safety_margins.csv");

/// Embedded revetment roughness factors.
pub static ROUGHNESS_CSV: &str = include_str!("../../fixtures/roughness.csv");

pub const KW_FILE: &str = "kw.csv";
pub const KL_FILE: &str = "kl.csv";
pub const LIMITING_FETCH_FILE: &str = "limiting_fetch.csv";
pub const SAFETY_MARGINS_FILE: &str = "safety_margins.csv";
pub const ROUGHNESS_FILE: &str = "roughness.csv";

static STANDARD: LazyLock<Tables> = LazyLock::new(|| {
    Tables::parse(
        KW_CSV,
        KL_CSV,
        LIMITING_FETCH_CSV,
        SAFETY_MARGINS_CSV,
        ROUGHNESS_CSV,
    )
    .expect("embedded reference tables failed to parse")
});

/// All reference data used by the calculators, read-only once built.
#[derive(Debug, Clone)]
pub struct Tables {
    /// Kw against local wind speed Vw, already scaled by 10⁻⁶
    pub kw: LookupTable,
    /// kl against design wind speed Vl, one table per rough terrain
    pub kl: BTreeMap<Terrain, LookupTable>,
    /// Limiting fetch (km) against wind speed
    pub limiting_fetch: LookupTable,
    pub margins: SafetyMargins,
    pub roughness: RoughnessTable,
}

#[derive(Debug, Deserialize)]
struct KwRow {
    wind_speed: f64,
    kw_1e6: f64,
}

#[derive(Debug, Deserialize)]
struct LimitingFetchRow {
    wind_speed: f64,
    fetch_km: f64,
}

impl Tables {
    /// The tables embedded at compile time.
    pub fn standard() -> &'static Tables {
        &STANDARD
    }

    /// Load every table from `dir`, using the same file names as `fixtures/`.
    pub fn from_dir(dir: &Path) -> Result<Tables> {
        info!("Loading reference tables from {}", dir.display());
        let read = |file: &str| std::fs::read_to_string(dir.join(file));
        Tables::parse(
            &read(KW_FILE)?,
            &read(KL_FILE)?,
            &read(LIMITING_FETCH_FILE)?,
            &read(SAFETY_MARGINS_FILE)?,
            &read(ROUGHNESS_FILE)?,
        )
    }

    /// Build the tables from CSV strings.
    pub fn parse(
        kw_csv: &str,
        kl_csv: &str,
        limiting_fetch_csv: &str,
        margins_csv: &str,
        roughness_csv: &str,
    ) -> Result<Tables> {
        Ok(Tables {
            kw: parse_kw(kw_csv)?,
            kl: parse_kl(kl_csv)?,
            limiting_fetch: parse_limiting_fetch(limiting_fetch_csv)?,
            margins: SafetyMargins::parse_csv(margins_csv)?,
            roughness: RoughnessTable::parse_csv(roughness_csv)?,
        })
    }

    /// kl table for a rough terrain; `None` for smooth terrains.
    pub fn kl_table(&self, terrain: Terrain) -> Option<&LookupTable> {
        self.kl.get(&terrain)
    }
}

fn parse_kw(csv_object: &str) -> Result<LookupTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_object.as_bytes());
    let rows = rdr
        .deserialize::<KwRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let points = rows.iter().map(|row| (row.wind_speed, row.kw_1e6)).collect();
    Ok(LookupTable::new("Kw", points)?.scale_values(1e-6))
}

fn parse_limiting_fetch(csv_object: &str) -> Result<LookupTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_object.as_bytes());
    let rows = rdr
        .deserialize::<LimitingFetchRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let points = rows.iter().map(|row| (row.wind_speed, row.fetch_km)).collect();
    LookupTable::new("Dmax", points)
}

/// First column is the wind speed, every further column is one rough terrain.
fn parse_kl(csv_object: &str) -> Result<BTreeMap<Terrain, LookupTable>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_object.as_bytes());
    let terrains = rdr
        .headers()?
        .iter()
        .skip(1)
        .map(|header| header.parse::<Terrain>())
        .collect::<Result<Vec<_>>>()?;
    if let Some(smooth) = terrains.iter().find(|terrain| terrain.is_smooth()) {
        return Err(TableError::InvalidTable {
            name: "kl".to_string(),
            reason: format!("smooth terrain '{}' has a fixed kl of 1.0", smooth),
        });
    }

    let mut speeds = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); terrains.len()];
    for row in rdr.records() {
        let record = row?;
        let values = record
            .iter()
            .map(|cell| {
                cell.parse::<f64>().map_err(|_| TableError::InvalidTable {
                    name: "kl".to_string(),
                    reason: format!("invalid number '{}'", cell),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let (speed, kls) = values.split_first().ok_or_else(|| TableError::InvalidTable {
            name: "kl".to_string(),
            reason: "empty row".to_string(),
        })?;
        if kls.len() != terrains.len() {
            return Err(TableError::InvalidTable {
                name: "kl".to_string(),
                reason: format!("row for {} m/s has {} values", speed, kls.len()),
            });
        }
        speeds.push(*speed);
        for (column, kl) in columns.iter_mut().zip(kls) {
            column.push(*kl);
        }
    }

    terrains
        .into_iter()
        .zip(columns)
        .map(|(terrain, column)| {
            let table = LookupTable::from_columns(format!("kl ({})", terrain), &speeds, &column)?;
            Ok((terrain, table))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dyke_class::DykeClass;

    #[test]
    fn test_standard_tables() {
        let tables = Tables::standard();
        assert_eq!(tables.kw.points().len(), 4);
        assert!((tables.kw.points()[1].1 - 3.0e-6).abs() < 1e-15);
        assert_eq!(tables.kl.len(), 3);
        assert_eq!(tables.kl_table(Terrain::B).unwrap().points()[0], (10.0, 1.30));
        assert!(tables.kl_table(Terrain::OpenWater).is_none());
        assert_eq!(tables.limiting_fetch.domain(), (20.0, 50.0));
        assert_eq!(tables.margins.river(DykeClass::Special).unwrap(), 0.80);
        assert_eq!(tables.margins.sea(DykeClass::V).unwrap(), 0.2);
        assert_eq!(tables.roughness.entries().len(), 11);
        assert_eq!(tables.roughness.gamma_f("Kè đá đổ hai lớp"), Some(0.55));
    }

    #[test]
    fn test_kl_rejects_smooth_column() {
        let err = parse_kl("wind_speed,A,Mặt nước\n10,1.1,1.0\n20,1.09,1.0\n").unwrap_err();
        assert!(matches!(err, TableError::InvalidTable { .. }));
    }

    #[test]
    fn test_kl_rejects_unknown_terrain() {
        let err = parse_kl("wind_speed,A,Z\n10,1.1,1.0\n20,1.09,1.0\n").unwrap_err();
        assert!(matches!(err, TableError::UnknownTerrain(_)));
    }

    #[test]
    fn test_kl_rejects_short_row() {
        assert!(parse_kl("wind_speed,A,B\n10,1.1,1.3\n20,1.09\n").is_err());
    }

    #[test]
    fn test_from_dir_missing_file() {
        let err = Tables::from_dir(Path::new("/nonexistent/dyke-tables")).unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }
}
