// fusion_sim/src/simulation/config/mod.rs

//! This module handles loading and validating scenario configuration from
//! disk. A scenario file is layered over the built-in defaults, and
//! `FUSION_`-prefixed environment variables override both
//! (e.g. `FUSION_FILTER__STD_A=1.5`).

pub mod structs;

use crate::error::SimError;
use crate::simulation::core::prng::zero_mean_noise;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub use structs::{ScenarioConfig, SensorConfig, SourceConfig, SyntheticConfig, TruthConfig};

/// Loads one scenario file and validates the filter configuration in it.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    if !path.is_file() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }
    info!("Loading scenario from: {}", path.display());

    let mut config: ScenarioConfig = Figment::from(Serialized::defaults(ScenarioConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FUSION_").split("__"))
        .extract()?;

    config.filter.validate()?;

    match &mut config.source {
        SourceConfig::Replay { path: log_path } if log_path.is_relative() => {
            if let Some(dir) = path.parent() {
                *log_path = dir.join(&*log_path);
            }
        }
        SourceConfig::Synthetic(synthetic) => validate_synthetic(synthetic)?,
        _ => {}
    }

    debug!("Resolved scenario: {:?}", config);
    Ok(config)
}

fn validate_synthetic(config: &SyntheticConfig) -> Result<(), SimError> {
    let positive = |name: &str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(SimError::InvalidScenario(format!(
                "{} must be positive and finite, got {}",
                name, value
            )))
        }
    };
    positive("duration_s", config.duration_s)?;
    positive("truth.step_s", config.truth.step_s)?;

    for (name, rate) in [
        ("lidar.rate_hz", config.lidar.rate_hz),
        ("radar.rate_hz", config.radar.rate_hz),
    ] {
        if !rate.is_finite() || rate < 0.0 {
            return Err(SimError::InvalidScenario(format!(
                "{} must be finite and not negative, got {}",
                name, rate
            )));
        }
    }

    let deviations = [
        ("truth.std_a", config.truth.std_a),
        ("truth.std_yawdd", config.truth.std_yawdd),
        ("lidar.noise.std_px", config.lidar.noise.std_px),
        ("lidar.noise.std_py", config.lidar.noise.std_py),
        ("radar.noise.std_r", config.radar.noise.std_r),
        ("radar.noise.std_phi", config.radar.noise.std_phi),
        ("radar.noise.std_rdot", config.radar.noise.std_rdot),
    ];
    for (name, std) in deviations {
        zero_mean_noise(name, std)?;
    }
    Ok(())
}

/// Expands `path` into the scenario files to run: the file itself, or every
/// `.toml` file below it (sorted) when it is a directory.
pub fn scenario_paths(path: &Path) -> Result<Vec<PathBuf>, SimError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "toml")
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }
    Ok(paths)
}
