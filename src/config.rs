use std::path::PathBuf;

use clap::{Parser, ValueHint};

use crate::state::Mode;

pub const DEFAULT_DATA_FILE: &str = "final_cleaned.csv";

/// Command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "reprosight")]
#[command(about = "ReproSight: interactive dashboard for metal exposure and reproductive health")]
pub struct Config {
    /// Survey table to open on start-up (.csv, .parquet or .json)
    #[arg(env = "REPROSIGHT_DATA", default_value = DEFAULT_DATA_FILE, value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    /// View shown first
    #[arg(long, value_enum, default_value_t = Mode::Landing)]
    pub mode: Mode,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
