// fusion_core/src/models/dynamics/ctrv.rs

use crate::models::dynamics::EstimationDynamics;
use crate::state::StateVariable;
use crate::types::{State, N_AUG, N_X};
use nalgebra::DVector;

/// Below this yaw rate (rad/s) the arc integral is replaced by a straight line.
pub const DEFAULT_YAW_RATE_THRESHOLD: f64 = 0.001;

/// Constant Turn Rate and Velocity kinematics with additive acceleration noise.
///
/// Augmented layout: `[px, py, v, yaw, yaw_rate, nu_a, nu_yawdd]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrvModel {
    pub yaw_rate_threshold: f64,
}

impl Default for CtrvModel {
    fn default() -> Self {
        Self {
            yaw_rate_threshold: DEFAULT_YAW_RATE_THRESHOLD,
        }
    }
}

impl EstimationDynamics for CtrvModel {
    fn state_dim(&self) -> usize {
        N_X
    }

    fn noise_dim(&self) -> usize {
        N_AUG - N_X
    }

    fn angle_index(&self) -> Option<usize> {
        Some(StateVariable::Yaw.index())
    }

    fn propagate(&self, augmented: &DVector<f64>, dt: f64) -> State {
        let p_x = augmented[0];
        let p_y = augmented[1];
        let v = augmented[2];
        let yaw = augmented[3];
        let yawd = augmented[4];
        let nu_a = augmented[5];
        let nu_yawdd = augmented[6];

        // --- 1. Deterministic motion ---
        let (mut px_p, mut py_p) = if yawd.abs() > self.yaw_rate_threshold {
            (
                p_x + v / yawd * ((yaw + yawd * dt).sin() - yaw.sin()),
                p_y + v / yawd * (yaw.cos() - (yaw + yawd * dt).cos()),
            )
        } else {
            // Avoid division by a near-zero yaw rate.
            (p_x + v * dt * yaw.cos(), p_y + v * dt * yaw.sin())
        };
        let mut v_p = v;
        let mut yaw_p = yaw + yawd * dt;
        let mut yawd_p = yawd;

        // --- 2. Process noise ---
        let dt2 = dt * dt;
        px_p += 0.5 * nu_a * dt2 * yaw.cos();
        py_p += 0.5 * nu_a * dt2 * yaw.sin();
        v_p += nu_a * dt;
        yaw_p += 0.5 * nu_yawdd * dt2;
        yawd_p += nu_yawdd * dt;

        DVector::from_vec(vec![px_p, py_p, v_p, yaw_p, yawd_p])
    }
}
