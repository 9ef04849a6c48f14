//! dyke-cli - crest elevations of river and sea dykes from CSV site tables.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "dyke-cli",
    version,
    about = "River and sea dyke crest elevation calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: dyke_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    dyke_cmd::run(cli.command)
}
