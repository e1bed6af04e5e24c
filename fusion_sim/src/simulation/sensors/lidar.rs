// fusion_sim/src/simulation/sensors/lidar.rs

use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::simulation::config::SensorConfig;
use crate::simulation::core::prng::{zero_mean_noise, SimulationRng};
use crate::simulation::sensors::{period_from_rate, SimulatedSensor};
use crate::simulation::truth::TruthState;
use fusion_core::config::LidarNoise;
use fusion_core::messages::{MeasurementMessage, SensorKind};

/// A lidar returning the target position with independent Gaussian noise
/// on each axis.
#[derive(Debug, Clone)]
pub struct SimulatedLidar {
    period_us: u64,
    noise_px: Normal<f64>,
    noise_py: Normal<f64>,
}

impl SimulatedLidar {
    pub fn new(config: &SensorConfig<LidarNoise>) -> Result<Self, SimError> {
        let noise = |name: &str, std: f64| zero_mean_noise(&format!("lidar.{}", name), std);
        Ok(Self {
            period_us: period_from_rate(config.rate_hz),
            noise_px: noise("std_px", config.noise.std_px)?,
            noise_py: noise("std_py", config.noise.std_py)?,
        })
    }
}

impl SimulatedSensor for SimulatedLidar {
    fn kind(&self) -> SensorKind {
        SensorKind::Lidar
    }

    fn period_us(&self) -> u64 {
        self.period_us
    }

    fn measure(&self, truth: &TruthState, rng: &mut SimulationRng) -> MeasurementMessage {
        MeasurementMessage::lidar(
            truth.px + self.noise_px.sample(&mut rng.0),
            truth.py + self.noise_py.sample(&mut rng.0),
            truth.timestamp_us,
        )
    }
}
