// fusion_sim/src/simulation/truth.rs

use crate::error::SimError;
use crate::simulation::config::TruthConfig;
use crate::simulation::core::prng::{zero_mean_noise, SimulationRng};
use crate::simulation::TruthSample;
use fusion_core::models::dynamics::{ctrv::CtrvModel, EstimationDynamics};
use fusion_core::utils::angles::normalize_angle;
use nalgebra::DVector;
use rand_distr::{Distribution, Normal};

/// The true CTRV state of the target at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruthState {
    pub timestamp_us: u64,
    pub px: f64,
    pub py: f64,
    pub v: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
}

impl TruthState {
    pub fn sample(&self) -> TruthSample {
        TruthSample {
            px: self.px,
            py: self.py,
            vx: self.v * self.yaw.cos(),
            vy: self.v * self.yaw.sin(),
        }
    }
}

/// Integrates a ground-truth trajectory with the same CTRV kinematics the
/// filter assumes, driving it with piecewise-constant random accelerations.
#[derive(Debug, Clone)]
pub struct TruthTrajectory {
    config: TruthConfig,
    model: CtrvModel,
    accel_noise: Normal<f64>,
    yaw_accel_noise: Normal<f64>,
}

impl TruthTrajectory {
    pub fn new(config: &TruthConfig) -> Result<Self, SimError> {
        let noise = |name: &str, std: f64| zero_mean_noise(&format!("truth.{}", name), std);
        Ok(Self {
            config: *config,
            model: CtrvModel::default(),
            accel_noise: noise("std_a", config.std_a)?,
            yaw_accel_noise: noise("std_yawdd", config.std_yawdd)?,
        })
    }

    /// States every `step_s` seconds from `t = 0` up to and including `duration_s`.
    pub fn generate(&self, duration_s: f64, rng: &mut SimulationRng) -> Vec<TruthState> {
        let step_us = (self.config.step_s * 1e6).round().max(1.0) as u64;
        let end_us = (duration_s * 1e6).round() as u64;
        let dt = step_us as f64 * 1e-6;

        let mut current = TruthState {
            timestamp_us: 0,
            px: self.config.px,
            py: self.config.py,
            v: self.config.v,
            yaw: normalize_angle(self.config.yaw),
            yaw_rate: self.config.yaw_rate,
        };
        let mut states = Vec::with_capacity((end_us / step_us) as usize + 1);
        states.push(current);

        while current.timestamp_us + step_us <= end_us {
            let augmented = DVector::from_vec(vec![
                current.px,
                current.py,
                current.v,
                current.yaw,
                current.yaw_rate,
                self.accel_noise.sample(&mut rng.0),
                self.yaw_accel_noise.sample(&mut rng.0),
            ]);
            let next = self.model.propagate(&augmented, dt);

            current = TruthState {
                timestamp_us: current.timestamp_us + step_us,
                px: next[0],
                py: next[1],
                v: next[2],
                yaw: normalize_angle(next[3]),
                yaw_rate: next[4],
            };
            states.push(current);
        }
        states
    }
}
