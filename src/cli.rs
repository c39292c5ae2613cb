use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Logistics control-tower data pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline and write the enriched tables as CSV
    Export(ExportArgs),
    /// Preview the first rows of a derived table
    Preview(PreviewArgs),
    /// Show the ranked fleet leaderboard
    Fleet(FleetArgs),
    /// Summarize revenue at risk, carbon and service recovery
    Summary(SummaryArgs),
}

/// Where the source tables live and how to read them.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Directory searched for the source CSVs (then its `data/` subdirectory)
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// YAML pipeline configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long)]
    pub encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output directory for enriched_orders.csv, fleet_ranking.csv and warehouse_inventory.csv
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetKind {
    Orders,
    Fleet,
    Inventory,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Derived table to show
    #[arg(long, value_enum, default_value_t = DatasetKind::Orders)]
    pub dataset: DatasetKind,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct FleetArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Show only the N best-ranked vehicles
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Restrict to orders from this origin city
    #[arg(long)]
    pub region: Option<String>,
    /// Restrict to these priorities (repeatable, comma separated)
    #[arg(long = "priority", action = clap::ArgAction::Append, value_delimiter = ',')]
    pub priorities: Vec<String>,
    /// Emit the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
