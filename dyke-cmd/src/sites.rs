//! Site tables read from CSV.
//!
//! A cell that is not a number is logged and read as blank, so the row
//! still reaches the calculators, which report the field as undefined.

use dyke_calc::{FetchInput, RiverSite, SeaSite};
use dyke_utils::cells::parse_number;
use dyke_utils::rays::parse_ray_list;
use log::warn;
use serde::{Deserialize, Deserializer};
use std::io;

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = String::deserialize(deserializer)?;
    match parse_number(&cell) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("{:#}, read as blank", e);
            Ok(None)
        }
    }
}

/// One row of a river site CSV:
/// `line,class,terrain,htk,depth,wind_angle,rays,fetch_m,construction_freeboard,settlement`
#[derive(Debug, Deserialize)]
struct RiverRecord {
    line: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    terrain: String,
    #[serde(default, deserialize_with = "lenient_number")]
    htk: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    depth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    wind_angle: Option<f64>,
    /// Ray lengths in m separated by ';'
    #[serde(default)]
    rays: String,
    #[serde(default, deserialize_with = "lenient_number")]
    fetch_m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    construction_freeboard: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    settlement: Option<f64>,
}

/// One row of a sea site CSV:
/// `line,class,hsp,tp,alpha,slope,berm_width,berm_wavelength,wave_angle,wind_angle,q_allowed,material,ztkp,freeboard`
#[derive(Debug, Deserialize)]
struct SeaRecord {
    line: String,
    #[serde(default)]
    class: String,
    #[serde(default, deserialize_with = "lenient_number")]
    hsp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    tp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    alpha: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    slope: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    berm_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    berm_wavelength: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    wave_angle: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    wind_angle: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    q_allowed: Option<f64>,
    #[serde(default)]
    material: String,
    #[serde(default, deserialize_with = "lenient_number")]
    ztkp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    freeboard: Option<f64>,
}

/// Fetch source of a river row: rays when given, otherwise a direct fetch,
/// otherwise wide water.
pub fn fetch_input(rays: &str, fetch_m: Option<f64>) -> FetchInput {
    if rays.trim().is_empty() {
        return match fetch_m {
            Some(length) => FetchInput::Direct(length),
            None => FetchInput::WideWater,
        };
    }
    match parse_ray_list(rays) {
        Ok(rays) => FetchInput::Rays(rays),
        Err(e) => FetchInput::Malformed(format!("{:#}", e)),
    }
}

impl From<RiverRecord> for RiverSite {
    fn from(record: RiverRecord) -> Self {
        RiverSite {
            fetch: fetch_input(&record.rays, record.fetch_m),
            line: record.line.trim().to_string(),
            class: record.class,
            terrain: record.terrain,
            design_water_level: record.htk,
            depth: record.depth,
            wind_angle: record.wind_angle,
            construction_freeboard: record.construction_freeboard,
            settlement: record.settlement,
        }
    }
}

impl From<SeaRecord> for SeaSite {
    fn from(record: SeaRecord) -> Self {
        let material = record.material.trim();
        SeaSite {
            line: record.line.trim().to_string(),
            class: record.class,
            wave_height: record.hsp,
            peak_period: record.tp,
            spectral_shape: record.alpha,
            slope: record.slope,
            berm_width: record.berm_width,
            berm_wavelength: record.berm_wavelength,
            wave_angle: record.wave_angle,
            wind_angle: record.wind_angle,
            allowed_discharge: record.q_allowed,
            material: (!material.is_empty()).then(|| material.to_string()),
            design_water_level: record.ztkp,
            freeboard: record.freeboard,
        }
    }
}

fn read_records<R, T>(reader: R) -> anyhow::Result<Vec<T>>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for (index, result) in rdr.deserialize::<T>().enumerate() {
        // header is line 1
        let record = result.map_err(|e| anyhow::anyhow!("Row {}: {}", index + 2, e))?;
        records.push(record);
    }
    Ok(records)
}

/// Read river sites in file order.
pub fn read_river_sites<R: io::Read>(reader: R) -> anyhow::Result<Vec<RiverSite>> {
    Ok(read_records::<R, RiverRecord>(reader)?
        .into_iter()
        .map(RiverSite::from)
        .collect())
}

/// Read sea sites in file order.
pub fn read_sea_sites<R: io::Read>(reader: R) -> anyhow::Result<Vec<SeaSite>> {
    Ok(read_records::<R, SeaRecord>(reader)?
        .into_iter()
        .map(SeaSite::from)
        .collect())
}
