use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Compare two instruments as synchronized price charts")]
pub struct Cli {
    /// Path to the config file (falls back to $CHART_PIPELINE_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build chart specs for two symbols and print them as JSON
    Compare(CompareArgs),

    /// List the configured tickers
    Tickers,

    /// List the configured indicator options
    Indicators,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Directory holding one <SYMBOL>.json raw table per symbol
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Single batched raw table with (field, symbol) columns
    #[arg(long, value_name = "FILE")]
    pub batch_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Main symbol (defaults.primary when omitted)
    #[arg(long)]
    pub primary: Option<String>,

    /// Comparison symbol (defaults.secondary when omitted)
    #[arg(long)]
    pub secondary: Option<String>,

    /// Start date, inclusive, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,

    /// End date, exclusive, YYYY-MM-DD
    #[arg(short, long)]
    pub end: Option<String>,

    /// Indicator to overlay, e.g. "30 Day SMA" (repeatable)
    #[arg(long = "indicator", value_name = "LABEL")]
    pub indicators: Vec<String>,

    /// Overlay every configured indicator option
    #[arg(long, conflicts_with = "indicators")]
    pub all_indicators: bool,

    /// Hide chart legends
    #[arg(long)]
    pub no_legend: bool,
}
