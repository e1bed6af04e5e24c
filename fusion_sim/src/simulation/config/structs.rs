// fusion_sim/src/simulation/config/structs.rs

use fusion_core::config::{LidarNoise, RadarNoise, UkfConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The top-level structure of a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    /// Parameters of the filter under test.
    pub filter: UkfConfig,
    /// Where the measurements come from.
    pub source: SourceConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            filter: UkfConfig::default(),
            source: SourceConfig::Synthetic(SyntheticConfig::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Generate a ground-truth trajectory and sample noisy sensors from it.
    Synthetic(SyntheticConfig),
    /// Read a recorded measurement log. Relative paths are resolved against
    /// the directory of the scenario file.
    Replay { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub duration_s: f64,
    pub truth: TruthConfig,
    pub lidar: SensorConfig<LidarNoise>,
    pub radar: SensorConfig<RadarNoise>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_s: 25.0,
            truth: TruthConfig::default(),
            lidar: SensorConfig {
                rate_hz: 10.0,
                noise: LidarNoise::default(),
            },
            radar: SensorConfig {
                rate_hz: 10.0,
                noise: RadarNoise::default(),
            },
        }
    }
}

/// Initial state and process noise of the simulated target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruthConfig {
    pub px: f64,
    pub py: f64,
    pub v: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    /// Longitudinal acceleration std of the target, m/s^2.
    pub std_a: f64,
    /// Yaw acceleration std of the target, rad/s^2.
    pub std_yawdd: f64,
    /// Integration step of the truth trajectory, seconds.
    pub step_s: f64,
}

impl Default for TruthConfig {
    fn default() -> Self {
        Self {
            px: 6.0,
            py: 2.0,
            v: 4.0,
            yaw: 0.3,
            yaw_rate: 0.2,
            std_a: 0.5,
            std_yawdd: 0.1,
            step_s: 0.01,
        }
    }
}

/// Sampling rate and noise of one simulated sensor. A rate of zero disables it.
/// A missing `noise` table falls back to the sensor's default noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig<N> {
    pub rate_hz: f64,
    #[serde(default)]
    pub noise: N,
}
