//! Result tables: one output row per input row, input columns first.

use crate::OutputFormat;
use dyke_calc::diagnostics::summarize;
use dyke_calc::{Evaluated, FetchInput, RiverResult, RiverSite, SeaResult, SeaSite};
use dyke_utils::cells::format_number;
use serde::Serialize;
use std::io;

#[derive(Debug, Serialize)]
struct RiverRow {
    line: String,
    class: String,
    terrain: String,
    htk: String,
    depth: String,
    wind_angle: String,
    fetch_source: &'static str,
    construction_freeboard: String,
    settlement: String,
    vl: String,
    storm_frequency: String,
    kfl: String,
    kl: String,
    vw: String,
    fetch_m: String,
    kw: String,
    delta_h: String,
    iterations: String,
    converged: String,
    a: String,
    zds: String,
    diagnostics: String,
}

#[derive(Debug, Serialize)]
struct SeaRow {
    line: String,
    class: String,
    hsp: String,
    tp: String,
    alpha: String,
    slope: String,
    berm_width: String,
    berm_wavelength: String,
    wave_angle: String,
    wind_angle: String,
    q_allowed: String,
    material: String,
    ztkp: String,
    freeboard: String,
    tm: String,
    s0: String,
    tan_alpha: String,
    berm: String,
    gamma_b: String,
    gamma_f: String,
    xi: String,
    gamma_beta_runup: String,
    waves: String,
    rslp: String,
    a: String,
    zdb: String,
    gamma_beta_overtopping: String,
    gamma_v: String,
    rcp_hsp: String,
    gamma_f_star: String,
    regime: String,
    rcp: String,
    q_calc: String,
    iterations: String,
    converged: String,
    zdb_tran: String,
    diagnostics: String,
}

fn label<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn fetch_source(fetch: &FetchInput) -> &'static str {
    match fetch {
        FetchInput::Rays(_) => "rays",
        FetchInput::Direct(_) => "direct",
        FetchInput::WideWater => "wide water",
        FetchInput::Malformed(_) => "malformed",
    }
}

impl From<&Evaluated<RiverSite, RiverResult>> for RiverRow {
    fn from(row: &Evaluated<RiverSite, RiverResult>) -> Self {
        let (site, result) = (&row.site, &row.result);
        RiverRow {
            line: site.line.clone(),
            class: site.class.clone(),
            terrain: site.terrain.clone(),
            htk: format_number(site.design_water_level, 2),
            depth: format_number(site.depth, 2),
            wind_angle: format_number(site.wind_angle, 1),
            fetch_source: fetch_source(&site.fetch),
            construction_freeboard: format_number(site.construction_freeboard, 2),
            settlement: format_number(site.settlement, 2),
            vl: format_number(result.design_wind_speed, 1),
            storm_frequency: format_number(result.storm_frequency, 0),
            kfl: format_number(result.kfl, 4),
            kl: format_number(result.kl, 4),
            vw: format_number(result.local_wind_speed, 3),
            fetch_m: format_number(result.fetch_m, 1),
            kw: format_number(result.kw.map(|kw| kw * 1e6), 4),
            delta_h: format_number(result.wave_setup, 4),
            iterations: label(result.wave_setup_iterations),
            converged: label(result.wave_setup_converged),
            a: format_number(result.safety_margin, 2),
            zds: format_number(result.crest_elevation, 3),
            diagnostics: summarize(&result.diagnostics),
        }
    }
}

impl From<&Evaluated<SeaSite, SeaResult>> for SeaRow {
    fn from(row: &Evaluated<SeaSite, SeaResult>) -> Self {
        let (site, result) = (&row.site, &row.result);
        SeaRow {
            line: site.line.clone(),
            class: site.class.clone(),
            hsp: format_number(site.wave_height, 2),
            tp: format_number(site.peak_period, 2),
            alpha: format_number(site.spectral_shape, 2),
            slope: format_number(site.slope, 2),
            berm_width: format_number(site.berm_width, 2),
            berm_wavelength: format_number(site.berm_wavelength, 2),
            wave_angle: format_number(site.wave_angle, 1),
            wind_angle: format_number(site.wind_angle, 1),
            q_allowed: format_number(site.allowed_discharge, 2),
            material: site.material.clone().unwrap_or_default(),
            ztkp: format_number(site.design_water_level, 2),
            freeboard: format_number(site.freeboard, 2),
            tm: format_number(result.spectral_period, 3),
            s0: format_number(result.steepness, 4),
            tan_alpha: format_number(result.tan_alpha, 4),
            berm: label(result.berm_status),
            gamma_b: format_number(result.gamma_b, 3),
            gamma_f: format_number(result.gamma_f, 2),
            xi: format_number(result.xi_runup, 3),
            gamma_beta_runup: format_number(result.gamma_beta_runup, 3),
            waves: label(result.breaking_state),
            rslp: format_number(result.run_up, 3),
            a: format_number(result.safety_margin, 2),
            zdb: format_number(result.crest_no_overtopping, 3),
            gamma_beta_overtopping: format_number(result.gamma_beta_overtopping, 3),
            gamma_v: format_number(result.gamma_v, 3),
            rcp_hsp: format_number(result.freeboard_ratio, 3),
            gamma_f_star: format_number(result.gamma_f_star, 3),
            regime: label(result.overtopping_regime),
            rcp: format_number(result.freeboard, 3),
            q_calc: format_number(result.discharge, 3),
            iterations: label(result.freeboard_iterations),
            converged: label(result.freeboard_converged),
            zdb_tran: format_number(result.crest_overtopping, 3),
            diagnostics: summarize(&result.diagnostics),
        }
    }
}

fn write_csv<W, T>(rows: impl IntoIterator<Item = T>, writer: W) -> anyhow::Result<()>
where
    W: io::Write,
    T: Serialize,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json<W: io::Write, T: Serialize>(value: &T, mut writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_river<W: io::Write>(
    rows: &[Evaluated<RiverSite, RiverResult>],
    format: OutputFormat,
    writer: W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(rows.iter().map(RiverRow::from), writer),
        OutputFormat::Json => write_json(&rows, writer),
    }
}

pub fn write_sea<W: io::Write>(
    rows: &[Evaluated<SeaSite, SeaResult>],
    format: OutputFormat,
    writer: W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(rows.iter().map(SeaRow::from), writer),
        OutputFormat::Json => write_json(&rows, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{read_river_sites, read_sea_sites};
    use dyke_calc::{CalcSettings, Workflow};
    use dyke_tables::Tables;

    fn river_output(format: OutputFormat) -> String {
        let csv = include_str!("../../fixtures/river_sites.csv");
        let settings = CalcSettings::default();
        let rows = Workflow::new(Tables::standard(), &settings)
            .run_river(read_river_sites(csv.as_bytes()).unwrap());
        let mut out = Vec::new();
        write_river(&rows, format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_river_csv() {
        let output = river_output(OutputFormat::Csv);
        let mut rdr = csv::Reader::from_reader(output.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[0], "line");
        assert_eq!(&headers[headers.len() - 1], "diagnostics");
        let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
        let zds = column("zds");
        let diagnostics = headers.len() - 1;
        // every input column precedes the first calculated one
        assert!(column("construction_freeboard") < column("vl"));
        assert!(column("settlement") < column("vl"));

        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][0], "Tả Hồng K12");
        assert_eq!(&records[0][zds], "5.177");
        assert_eq!(&records[0][column("construction_freeboard")], "0.20");
        assert_eq!(&records[0][column("settlement")], "0.10");
        assert_eq!(&records[0][diagnostics], "");
        assert_eq!(&records[1][0], "Hữu Đuống K4");
        assert!(!records[1][zds].is_empty());
        assert_eq!(&records[2][0], "Tả Đáy K30");
        assert!(records[2][diagnostics].starts_with("L: "));
    }

    #[test]
    fn test_river_json() {
        let output = river_output(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["site"]["line"], "Tả Hồng K12");
        assert_eq!(rows[0]["result"]["wave_setup_iterations"], 4);
        assert_eq!(rows[2]["result"]["diagnostics"][0]["kind"], "Substituted");
    }

    #[test]
    fn test_sea_csv() {
        let csv = include_str!("../../fixtures/sea_sites.csv");
        let settings = CalcSettings::default();
        let rows = Workflow::new(Tables::standard(), &settings)
            .run_sea(read_sea_sites(csv.as_bytes()).unwrap());
        let mut out = Vec::new();
        write_sea(&rows, OutputFormat::Csv, &mut out).unwrap();

        let mut rdr = csv::Reader::from_reader(out.as_slice());
        let headers = rdr.headers().unwrap().clone();
        let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);

        for input in ["alpha", "berm_width", "berm_wavelength", "wave_angle", "wind_angle", "ztkp", "freeboard"] {
            assert!(column(input) < column("tm"), "{} is not an input column", input);
        }

        let first = &records[0];
        assert_eq!(&first[column("alpha")], "1.10");
        assert_eq!(&first[column("wave_angle")], "0.0");
        assert_eq!(&first[column("wind_angle")], "60.0");
        assert_eq!(&first[column("ztkp")], "2.10");
        assert_eq!(&first[column("freeboard")], "0.30");
        assert_eq!(&records[1][column("wave_angle")], "15.0");
        assert_eq!(&first[column("berm")], "no berm");
        assert_eq!(&first[column("waves")], "broken waves");
        assert_eq!(&first[column("rslp")], "5.623");
        assert_eq!(&first[column("rcp")], "2.546");
        assert_eq!(&first[column("regime")], "non-breaking");
        assert_eq!(&first[column("converged")], "true");
        assert!(first[column("diagnostics")].starts_with("γ_f: "));
    }

    #[test]
    fn test_label() {
        assert_eq!(label(Some(4usize)), "4");
        assert_eq!(label::<bool>(None), "");
    }
}
