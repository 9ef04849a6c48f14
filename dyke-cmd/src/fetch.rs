//! Standalone fetch tool: effective fetch and its Dmax admissibility.

use crate::OutputFormat;
use clap::ValueEnum;
use dyke_calc::fetch::{check_fetch, limited_wide_fetch, narrow_fetch, FetchCheck, RayWeighting};
use dyke_tables::Tables;
use log::info;
use serde::Serialize;
use std::io;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Σ rᵢ·cos αᵢ / Σ cos αᵢ
    Cosine,
    /// Σ rᵢ·cos² αᵢ / Σ cos αᵢ
    CosineSquared,
}

impl From<Weighting> for RayWeighting {
    fn from(weighting: Weighting) -> Self {
        match weighting {
            Weighting::Cosine => RayWeighting::Cosine,
            Weighting::CosineSquared => RayWeighting::CosineSquared,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchSource {
    /// Ray lengths, km
    Rays(Vec<f64>),
    Wide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    pub method: &'static str,
    pub wind_speed: f64,
    pub numerator: Option<f64>,
    pub denominator: Option<f64>,
    /// Fetch before the Dmax check, km
    pub fetch_km: f64,
    pub check: FetchCheck,
}

/// Compute the fetch for `source` and check it against Dmax at `wind_speed`.
pub fn evaluate(
    source: &FetchSource,
    wind_speed: f64,
    weighting: Weighting,
    tables: &Tables,
) -> anyhow::Result<FetchReport> {
    let (method, numerator, denominator, fetch_km) = match source {
        FetchSource::Rays(rays) => {
            let fan = narrow_fetch(rays, weighting.into())?;
            ("narrow", Some(fan.numerator), Some(fan.denominator), fan.effective)
        }
        FetchSource::Wide => {
            let wide = limited_wide_fetch(wind_speed, None)
                .ok_or_else(|| anyhow::anyhow!("Wind speed must be positive, got {}", wind_speed))?;
            ("wide", None, None, wide.computed_km)
        }
    };
    let check = check_fetch(fetch_km, wind_speed, &tables.limiting_fetch)?;
    info!(
        "{} fetch {:.3} km, Dmax {:.1} km: {}",
        method,
        fetch_km,
        check.limit_km,
        if check.admissible { "admissible" } else { "exceeds Dmax" }
    );
    Ok(FetchReport {
        method,
        wind_speed,
        numerator,
        denominator,
        fetch_km,
        check,
    })
}

pub fn write_report<W: io::Write>(report: &FetchReport, format: OutputFormat, mut writer: W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            wtr.write_record(["quantity", "value"])?;
            wtr.write_record(["method", report.method])?;
            wtr.write_record(["wind_speed", report.wind_speed.to_string().as_str()])?;
            if let (Some(numerator), Some(denominator)) = (report.numerator, report.denominator) {
                wtr.write_record(["numerator", numerator.to_string().as_str()])?;
                wtr.write_record(["denominator", denominator.to_string().as_str()])?;
            }
            wtr.write_record(["fetch_km", report.fetch_km.to_string().as_str()])?;
            wtr.write_record(["dmax_km", report.check.limit_km.to_string().as_str()])?;
            if let Some(clamp) = report.check.clamp {
                wtr.write_record(["dmax_note", clamp.to_string().as_str()])?;
            }
            wtr.write_record(["admissible", report.check.admissible.to_string().as_str()])?;
            wtr.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_fan() {
        let report = evaluate(
            &FetchSource::Rays(vec![1.0; 13]),
            35.0,
            Weighting::CosineSquared,
            Tables::standard(),
        )
        .unwrap();
        assert_eq!(report.method, "narrow");
        assert!((report.numerator.unwrap() - 10.297877056362575).abs() < 1e-12);
        assert!((report.denominator.unwrap() - 11.495471490872774).abs() < 1e-12);
        assert!((report.check.limit_km - 400.0).abs() < 1e-9);
        assert!(report.check.admissible);
    }

    #[test]
    fn test_wide_water_check() {
        let report = evaluate(&FetchSource::Wide, 25.0, Weighting::Cosine, Tables::standard()).unwrap();
        assert_eq!(report.method, "wide");
        assert!((report.fetch_km - 200.0).abs() < 1e-9);
        assert_eq!(report.check.limit_km, 1200.0);
        assert!(report.check.admissible);

        let report = evaluate(&FetchSource::Wide, 2.0, Weighting::Cosine, Tables::standard()).unwrap();
        assert!(!report.check.admissible);
        assert!(report.check.clamp.is_some());
    }

    #[test]
    fn test_short_fan_is_an_error() {
        assert!(evaluate(
            &FetchSource::Rays(vec![1.0; 5]),
            30.0,
            Weighting::Cosine,
            Tables::standard()
        )
        .is_err());
    }

    #[test]
    fn test_csv_report() {
        let report = evaluate(
            &FetchSource::Rays(vec![2.0; 13]),
            30.0,
            Weighting::Cosine,
            Tables::standard(),
        )
        .unwrap();
        let mut out = Vec::new();
        write_report(&report, OutputFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("quantity,value\nmethod,narrow\n"));
        assert!(text.contains("dmax_km,600\n"));
        assert!(text.ends_with("admissible,true\n"));
    }
}
