// fusion_core/src/types.rs

use nalgebra::{DMatrix, DVector};

// --- Core Type Aliases ---
pub type State = DVector<f64>;
pub type Covariance = DMatrix<f64>;
/// Sigma points stored one per column.
pub type SigmaPoints = DMatrix<f64>;

// --- Filter Dimensions ---

/// Dimension of the kinematic CTRV state `[px, py, v, yaw, yaw_rate]`.
pub const N_X: usize = 5;

/// Dimension of the augmented state: the kinematic state plus the longitudinal
/// and yaw acceleration noise terms.
pub const N_AUG: usize = 7;

/// Number of sigma points generated from the augmented state.
pub const N_SIGMA: usize = 2 * N_AUG + 1;

/// Spreading parameter of the unscented transform for a distribution of
/// dimension `n`: `lambda = 3 - n`.
pub fn sigma_spread(n: usize) -> f64 {
    3.0 - n as f64
}
