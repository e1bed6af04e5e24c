// fusion_sim/src/simulation/sensors/mod.rs

use crate::error::SimError;
use crate::simulation::config::SyntheticConfig;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::truth::{TruthState, TruthTrajectory};
use crate::simulation::Record;
use fusion_core::messages::{MeasurementMessage, SensorKind};
use tracing::{debug, info};

pub mod lidar;
pub mod radar;

/// A simulated sensor sampling the ground truth at a fixed rate.
pub trait SimulatedSensor {
    fn kind(&self) -> SensorKind;

    /// Time between two readings, in microseconds.
    fn period_us(&self) -> u64;

    /// A noisy reading of `truth`.
    fn measure(&self, truth: &TruthState, rng: &mut SimulationRng) -> MeasurementMessage;
}

pub(crate) fn period_from_rate(rate_hz: f64) -> u64 {
    (1e6 / rate_hz).round().max(1.0) as u64
}

/// Builds the full, time-ordered measurement stream of a synthetic scenario.
///
/// Sensors with a zero rate are skipped. When two sensors fire on the same
/// truth step, lidar comes first.
pub fn synthesize(config: &SyntheticConfig) -> Result<Vec<Record>, SimError> {
    let mut rng = SimulationRng::from_seed(config.seed);
    let truth = TruthTrajectory::new(&config.truth)?.generate(config.duration_s, &mut rng);

    let mut sensors: Vec<Box<dyn SimulatedSensor>> = Vec::new();
    if config.lidar.rate_hz > 0.0 {
        sensors.push(Box::new(lidar::SimulatedLidar::new(&config.lidar)?));
    }
    if config.radar.rate_hz > 0.0 {
        sensors.push(Box::new(radar::SimulatedRadar::new(&config.radar)?));
    }
    if sensors.is_empty() {
        return Err(SimError::InvalidScenario(
            "at least one sensor needs a positive rate".to_string(),
        ));
    }

    for sensor in &sensors {
        debug!("Simulated {} every {} us", sensor.kind(), sensor.period_us());
    }

    let mut next_due = vec![0u64; sensors.len()];
    let mut records = Vec::new();
    for state in &truth {
        for (sensor, due) in sensors.iter().zip(next_due.iter_mut()) {
            if state.timestamp_us >= *due {
                records.push(Record {
                    message: sensor.measure(state, &mut rng),
                    truth: Some(state.sample()),
                });
                *due += sensor.period_us();
            }
        }
    }

    info!(
        "Synthesized {} measurements over {:.1} s (seed {})",
        records.len(),
        config.duration_s,
        config.seed
    );
    Ok(records)
}
