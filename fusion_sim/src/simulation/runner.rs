// fusion_sim/src/simulation/runner.rs

use crate::error::SimError;
use crate::simulation::config::{ScenarioConfig, SourceConfig};
use crate::simulation::evaluation::{RmseAccumulator, RunReport};
use crate::simulation::{replay, sensors, Record};
use fusion_core::prelude::*;
use tracing::{debug, info};

/// Collects the measurement stream of a scenario, ordered by timestamp.
/// Readings sharing a timestamp keep their source order.
pub fn load_records(source: &SourceConfig) -> Result<Vec<Record>, SimError> {
    let mut records = match source {
        SourceConfig::Synthetic(synthetic) => sensors::synthesize(synthetic)?,
        SourceConfig::Replay { path } => replay::load_log(path)?,
    };
    records.sort_by_key(|r| r.message.timestamp_us);
    Ok(records)
}

/// Runs the filter of `config` over its measurement source.
pub fn run_scenario(config: &ScenarioConfig) -> Result<RunReport, SimError> {
    let records = load_records(&config.source)?;
    run_records(config, &records)
}

/// Feeds `records` through a fresh filter and evaluates it.
///
/// A measurement the filter rejects is counted and skipped; the run goes on.
pub fn run_records(config: &ScenarioConfig, records: &[Record]) -> Result<RunReport, SimError> {
    info!("Running scenario '{}' over {} measurements", config.name, records.len());

    let mut ukf = UnscentedKalmanFilter::new(config.filter.clone())?;
    let mut lidar_nis = NisMonitor::new(SensorKind::Lidar);
    let mut radar_nis = NisMonitor::new(SensorKind::Radar);
    let mut rmse = RmseAccumulator::new();
    let mut rejected = 0;

    for record in records {
        let sensor = record.message.sensor_kind();
        let corrects = ukf.is_initialized() && ukf.is_enabled(sensor);

        if ukf.process(&record.message).is_err() {
            rejected += 1;
            continue;
        }

        if corrects {
            let nis = ukf.nis(sensor);
            match sensor {
                SensorKind::Lidar => lidar_nis.record(nis),
                SensorKind::Radar => radar_nis.record(nis),
            }
        }

        let state = ukf.get_state();
        debug!(
            timestamp_us = state.last_update_timestamp,
            px = state.get(StateVariable::Px),
            py = state.get(StateVariable::Py),
            v = state.get(StateVariable::V),
            yaw = state.get(StateVariable::Yaw),
            "state"
        );
        if let Some(truth) = &record.truth {
            rmse.add(state, truth);
        }
    }

    let state = ukf.get_state();
    let mut final_state = [0.0; 5];
    final_state.copy_from_slice(state.vector.as_slice());

    Ok(RunReport {
        scenario: config.name.clone(),
        measurements: records.len(),
        rejected,
        final_timestamp_us: state.last_update_timestamp,
        final_state,
        rmse: rmse.rmse(),
        nis: [lidar_nis, radar_nis]
            .iter()
            .filter(|m| m.count() > 0)
            .map(NisMonitor::summary)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::TruthSample;

    fn lidar(px: f64, py: f64, t: u64) -> Record {
        Record {
            message: MeasurementMessage::lidar(px, py, t),
            truth: Some(TruthSample {
                px,
                py,
                vx: 0.0,
                vy: 0.0,
            }),
        }
    }

    #[test]
    fn test_replay_records_are_sorted() {
        let dir = std::env::temp_dir().join(format!("fusion_sim_runner_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log.txt");
        std::fs::write(&path, "L 1 1 200\nR 1 0.1 0 100\nL 2 2 100\n").unwrap();

        let records = load_records(&SourceConfig::Replay { path }).unwrap();
        let stamps: Vec<u64> = records.iter().map(|r| r.message.timestamp_us).collect();
        assert_eq!(stamps, vec![100, 100, 200]);
        assert_eq!(records[0].message.sensor_kind(), SensorKind::Radar);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_first_measurement_records_no_nis() {
        let config = ScenarioConfig::default();
        let report = run_records(&config, &[lidar(1.0, 1.0, 0), lidar(1.0, 1.0, 100_000)]).unwrap();

        assert_eq!(report.measurements, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.nis.len(), 1);
        assert_eq!(report.nis[0].sensor, SensorKind::Lidar);
        assert_eq!(report.nis[0].count, 1);
        assert_eq!(report.final_timestamp_us, 100_000);
        assert!(report.rmse.is_some());
    }

    #[test]
    fn test_rejected_measurements_are_counted() {
        let config = ScenarioConfig::default();
        // Unsorted on purpose: run_records takes the stream as given.
        let records = [lidar(1.0, 1.0, 500), lidar(1.0, 1.0, 100), lidar(1.1, 1.0, 900)];
        let report = run_records(&config, &records).unwrap();

        assert_eq!(report.rejected, 1);
        assert_eq!(report.final_timestamp_us, 900);
    }
}
