// fusion_sim/src/simulation/evaluation.rs

use crate::simulation::TruthSample;
use fusion_core::estimation::consistency::NisSummary;
use fusion_core::state::FilterState;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Root-mean-square error of the estimated position and Cartesian velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rmse {
    pub px: f64,
    pub py: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Accumulates squared errors of `(px, py, vx, vy)` against ground truth.
#[derive(Debug, Clone, Default)]
pub struct RmseAccumulator {
    sum_sq: [f64; 4],
    count: usize,
}

impl RmseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the error of `state` with respect to `truth`.
    pub fn add(&mut self, state: &FilterState, truth: &TruthSample) {
        let (vx, vy) = state.velocity();
        let estimate = [state.vector[0], state.vector[1], vx, vy];
        let expected = [truth.px, truth.py, truth.vx, truth.vy];
        for ((sum, e), t) in self.sum_sq.iter_mut().zip(estimate).zip(expected) {
            *sum += (e - t).powi(2);
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until at least one sample was added.
    pub fn rmse(&self) -> Option<Rmse> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let [px, py, vx, vy] = self.sum_sq.map(|s| (s / n).sqrt());
        Some(Rmse { px, py, vx, vy })
    }
}

/// The outcome of running one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    /// Measurements handed to the filter.
    pub measurements: usize,
    /// Measurements the filter refused (out of order, numerical failure).
    pub rejected: usize,
    pub final_timestamp_us: u64,
    /// `[px, py, v, yaw, yaw_rate]` after the last measurement.
    pub final_state: [f64; 5],
    /// Present when the source carried ground truth.
    pub rmse: Option<Rmse>,
    pub nis: Vec<NisSummary>,
}

impl RunReport {
    pub fn log(&self) {
        info!(
            "[{}] {} measurements, {} rejected, final state {:?}",
            self.scenario, self.measurements, self.rejected, self.final_state
        );
        match &self.rmse {
            Some(rmse) => info!(
                "[{}] RMSE px {:.4} py {:.4} vx {:.4} vy {:.4}",
                self.scenario, rmse.px, rmse.py, rmse.vx, rmse.vy
            ),
            None => info!("[{}] no ground truth, RMSE not available", self.scenario),
        }
        for nis in &self.nis {
            info!(
                "[{}] {} NIS: {} samples, mean {:.3}, {:.1}% above {:.3}",
                self.scenario,
                nis.sensor,
                nis.count,
                nis.mean,
                nis.exceed_fraction * 100.0,
                nis.threshold
            );
        }
    }
}
