use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rmc_catalog::PnMatching;

#[derive(Parser, Debug)]
#[command(name = "rmc-query", version, about = "Query the parts catalog API")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one catalog query and print the JSON response
    Query(QueryArgs),
    /// Fetch an access token and print when it expires
    Token,
    /// Validate the configuration and print it with secrets redacted
    Check,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Part numbers to look up (at most 100); a sample batch in test mode
    /// when omitted
    pub part_numbers: Vec<String>,

    /// Matching strategy sent as `pn_matching`
    #[arg(long, default_value = "alphanumeric")]
    pub pn_matching: PnMatching,

    #[arg(long)]
    pub apply_filter_quantity: bool,

    #[arg(long)]
    pub ignore_empty_parts: bool,

    #[arg(long)]
    pub test_mode: bool,
}
