// fusion_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Runs the CTRV unscented Kalman filter over synthetic or recorded
/// lidar/radar measurements and reports its accuracy and consistency.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The scenario TOML file to run, or a directory of them.
    #[arg(short, long, default_value = "assets/scenarios/00_synthetic_turn.toml")]
    pub scenario: PathBuf,

    /// Replay this measurement log instead of the scenario's own source.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the seed of a synthetic scenario.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the run report(s) as TOML to this file.
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Enable DEBUG level logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
