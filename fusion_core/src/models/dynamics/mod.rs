// fusion_core/src/models/dynamics/mod.rs

use crate::types::{SigmaPoints, State};
use dyn_clone::DynClone;
use nalgebra::{DMatrix, DVector};
use std::fmt::Debug;

/// A trait for process models used by the unscented filter.
///
/// The model works on *augmented* vectors: the kinematic state followed by the
/// process noise terms. It returns the propagated kinematic state only, with
/// the noise already folded in.
pub trait EstimationDynamics: DynClone + Debug + Send + Sync {
    /// Length of the kinematic state this model propagates.
    fn state_dim(&self) -> usize;

    /// Number of process noise terms appended to the state for augmentation.
    fn noise_dim(&self) -> usize;

    /// Row of the state that holds an angle, if any. Deviations along this row
    /// are wrapped when moments are recombined.
    fn angle_index(&self) -> Option<usize> {
        None
    }

    /// Propagates one augmented vector over `dt` seconds (`dt >= 0`).
    fn propagate(&self, augmented: &DVector<f64>, dt: f64) -> State;

    /// Propagates every column of an augmented sigma point matrix.
    ///
    /// # Returns
    /// A `state_dim x ncols` matrix with the propagated points.
    fn propagate_sigma_points(&self, augmented: &SigmaPoints, dt: f64) -> SigmaPoints {
        let mut propagated = DMatrix::zeros(self.state_dim(), augmented.ncols());
        for i in 0..augmented.ncols() {
            let point = augmented.column(i).into_owned();
            propagated.column_mut(i).copy_from(&self.propagate(&point, dt));
        }
        propagated
    }
}

// This macro generates the implementation of `Clone` for `Box<dyn EstimationDynamics>`.
dyn_clone::clone_trait_object!(EstimationDynamics);

pub mod ctrv;
