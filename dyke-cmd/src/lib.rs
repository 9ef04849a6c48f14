//! Command implementations for the dyke crest CLI.
//!
//! Reads site tables from CSV, runs them through the calculators and writes
//! one result row per input row.

use clap::{Args, Subcommand, ValueEnum};
use dyke_calc::CalcSettings;
use dyke_tables::Tables;
use log::info;
use std::path::PathBuf;

pub mod fetch;
pub mod report;
pub mod sites;

#[derive(Subcommand)]
pub enum Command {
    /// Crest elevation of river dykes against wind-driven wave setup
    River {
        /// Input CSV of river dyke lines
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        options: Options,
    },

    /// Crest elevations of sea dykes against run-up and overtopping
    Sea {
        /// Input CSV of sea dyke lines
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        options: Options,
    },

    /// Effective fetch of a ray fan or wide water body, checked against Dmax
    Fetch {
        /// 13 ray lengths in km, separated by ';'
        #[arg(short, long, conflicts_with = "wide")]
        rays: Option<String>,

        /// Use the wide-water formula instead of a ray fan
        #[arg(long)]
        wide: bool,

        /// Wind speed w, m/s
        #[arg(short, long)]
        wind_speed: f64,

        /// Ray weighting of the fan average
        #[arg(long, value_enum, default_value_t = fetch::Weighting::CosineSquared)]
        weighting: fetch::Weighting,

        #[command(flatten)]
        options: Options,
    },
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Directory of reference table CSVs replacing the embedded ones
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// JSON file of calculation settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl Options {
    /// Read the settings file, or the defaults without one.
    pub fn settings(&self) -> anyhow::Result<CalcSettings> {
        match &self.config {
            Some(path) => {
                info!("Loading settings from {}", path.display());
                let json = std::fs::read_to_string(path)?;
                CalcSettings::from_json(&json)
                    .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
            }
            None => Ok(CalcSettings::default()),
        }
    }

    pub fn load_tables(&self) -> anyhow::Result<Option<Tables>> {
        self.tables
            .as_deref()
            .map(Tables::from_dir)
            .transpose()
            .map_err(anyhow::Error::from)
    }

    fn writer(&self) -> anyhow::Result<Box<dyn std::io::Write>> {
        Ok(match &self.output {
            Some(path) => Box::new(std::fs::File::create(path)?),
            None => Box::new(std::io::stdout().lock()),
        })
    }
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::River { input, options } => {
            let settings = options.settings()?;
            let loaded = options.load_tables()?;
            let tables = loaded.as_ref().unwrap_or_else(|| Tables::standard());
            let sites = sites::read_river_sites(std::fs::File::open(&input)?)?;
            info!("Read {} river lines from {}", sites.len(), input.display());
            let rows = dyke_calc::Workflow::new(tables, &settings).run_river(sites);
            report::write_river(&rows, options.format, options.writer()?)
        }
        Command::Sea { input, options } => {
            let settings = options.settings()?;
            let loaded = options.load_tables()?;
            let tables = loaded.as_ref().unwrap_or_else(|| Tables::standard());
            let sites = sites::read_sea_sites(std::fs::File::open(&input)?)?;
            info!("Read {} sea lines from {}", sites.len(), input.display());
            let rows = dyke_calc::Workflow::new(tables, &settings).run_sea(sites);
            report::write_sea(&rows, options.format, options.writer()?)
        }
        Command::Fetch {
            rays,
            wide,
            wind_speed,
            weighting,
            options,
        } => {
            let loaded = options.load_tables()?;
            let tables = loaded.as_ref().unwrap_or_else(|| Tables::standard());
            let source = match (rays, wide) {
                (Some(rays), _) => fetch::FetchSource::Rays(dyke_utils::rays::parse_ray_list(&rays)?),
                (None, true) => fetch::FetchSource::Wide,
                (None, false) => anyhow::bail!("Either --rays or --wide is required"),
            };
            let fetch_report = fetch::evaluate(&source, wind_speed, weighting, tables)?;
            fetch::write_report(&fetch_report, options.format, options.writer()?)
        }
    }
}
