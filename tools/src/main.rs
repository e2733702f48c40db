use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcsde_tools::extract::{extract, ExtractArgs};
use pcsde_tools::inspect::{inspect, InspectArgs};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
enum Cli {
    Extract(ExtractArgs),
    Inspect(InspectArgs),
}

fn main() -> Result<()> {
    // Warnings are printed by the subcommands themselves, RUST_LOG=pcsde=debug shows the tables
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse_from(wild::args()) {
        Cli::Extract(args) => extract(args),
        Cli::Inspect(args) => inspect(&args),
    }
}
