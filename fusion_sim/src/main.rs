// fusion_sim/src/main.rs

//! Runs one scenario, or a directory of them, through the unscented Kalman
//! filter and reports accuracy and NIS consistency.
//!
//! `cargo run -p fusion_sim -- --scenario assets/scenarios --report out.toml`

use clap::Parser;
use fusion_sim::prelude::*;
use fusion_sim::simulation::config::SourceConfig;
use serde::Serialize;
use tracing::{info, warn};

/// Top-level table of a written report file.
#[derive(Serialize)]
struct ReportFile<'a> {
    runs: &'a [RunReport],
}

fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}

/// Applies the command-line overrides to a loaded scenario.
fn apply_overrides(cli: &Cli, config: &mut ScenarioConfig) {
    if let Some(input) = &cli.input {
        config.source = SourceConfig::Replay { path: input.clone() };
    }
    if let Some(seed) = cli.seed {
        match &mut config.source {
            SourceConfig::Synthetic(synthetic) => synthetic.seed = seed,
            SourceConfig::Replay { .. } => {
                warn!("[{}] --seed has no effect on a replayed log", config.name)
            }
        }
    }
}

fn main() -> Result<(), SimError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut reports = Vec::new();
    for path in scenario_paths(&cli.scenario)? {
        let mut config = load_scenario(&path)?;
        apply_overrides(&cli, &mut config);

        let report = run_scenario(&config)?;
        report.log();
        reports.push(report);
    }

    if let Some(report_path) = &cli.report {
        let text = toml::to_string_pretty(&ReportFile { runs: &reports })?;
        std::fs::write(report_path, text).map_err(|source| SimError::Io {
            path: report_path.clone(),
            source,
        })?;
        info!("Report written to {}", report_path.display());
    }

    Ok(())
}
