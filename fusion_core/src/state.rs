// fusion_core/src/state.rs

use crate::types::{Covariance, State, N_X};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Every variable of the CTRV state vector, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateVariable {
    /// Position along the world x axis, meters.
    Px,
    /// Position along the world y axis, meters.
    Py,
    /// Speed magnitude along the heading, m/s.
    V,
    /// Heading angle, radians in (-pi, pi].
    Yaw,
    /// Heading rate, rad/s.
    YawRate,
}

impl StateVariable {
    /// The complete layout of the state vector.
    pub const LAYOUT: [StateVariable; N_X] = [
        StateVariable::Px,
        StateVariable::Py,
        StateVariable::V,
        StateVariable::Yaw,
        StateVariable::YawRate,
    ];

    /// Row of this variable inside the state vector.
    pub fn index(self) -> usize {
        match self {
            StateVariable::Px => 0,
            StateVariable::Py => 1,
            StateVariable::V => 2,
            StateVariable::Yaw => 3,
            StateVariable::YawRate => 4,
        }
    }
}

/// The belief held by a filter: mean, covariance and the time they refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// The mean `x`.
    pub vector: State,
    /// The covariance `P`.
    pub covariance: Covariance,
    /// Timestamp of the last measurement folded into this belief, in microseconds.
    pub last_update_timestamp: u64,
}

impl FilterState {
    /// A zero mean with the given diagonal covariance.
    pub fn new(covariance_diagonal: &[f64; N_X]) -> Self {
        Self {
            vector: DVector::zeros(N_X),
            covariance: DMatrix::from_diagonal(&DVector::from_column_slice(covariance_diagonal)),
            last_update_timestamp: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.vector.nrows()
    }

    pub fn get(&self, var: StateVariable) -> f64 {
        self.vector[var.index()]
    }

    /// Cartesian velocity `[vx, vy]` derived from speed and heading.
    pub fn velocity(&self) -> (f64, f64) {
        let v = self.get(StateVariable::V);
        let yaw = self.get(StateVariable::Yaw);
        (v * yaw.cos(), v * yaw.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_layout_matches_indices() {
        for (i, var) in StateVariable::LAYOUT.iter().enumerate() {
            assert_eq!(var.index(), i);
        }
    }

    #[test]
    fn test_new_state_is_identity_like() {
        let state = FilterState::new(&[1.0; N_X]);
        assert_eq!(state.dim(), N_X);
        assert_eq!(state.covariance, DMatrix::identity(N_X, N_X));
        assert!(state.vector.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_velocity_components() {
        let mut state = FilterState::new(&[1.0; N_X]);
        state.vector[StateVariable::V.index()] = 2.0;
        state.vector[StateVariable::Yaw.index()] = std::f64::consts::FRAC_PI_2;
        let (vx, vy) = state.velocity();
        assert_abs_diff_eq!(vx, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(vy, 2.0, epsilon = 1e-12);
    }
}
