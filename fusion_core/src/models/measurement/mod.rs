// fusion_core/src/models/measurement/mod.rs

use crate::estimation::unscented::{points_to_moments, Moments};
use crate::messages::SensorKind;
use crate::types::SigmaPoints;
use dyn_clone::DynClone;
use nalgebra::{DMatrix, DVector};
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a sensor. `z = h(x) + v`
pub trait Measurement: DynClone + Debug + Send + Sync {
    /// Which sensor this model describes.
    fn sensor_kind(&self) -> SensorKind;

    /// Length of the measurement vector `z`.
    fn dim(&self) -> usize {
        self.sensor_kind().measurement_dim()
    }

    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &DMatrix<f64>;

    /// Row of `z` that holds an angle, if any.
    fn angle_index(&self) -> Option<usize> {
        None
    }

    /// Predicts the ideal measurement `z_pred = h(x)` for one state vector.
    fn predict_measurement(&self, state: &DVector<f64>) -> DVector<f64>;

    /// Cartesian position `(px, py)` implied by a raw reading. Used to seed the
    /// filter from its very first measurement.
    fn initial_position(&self, z: &DVector<f64>) -> (f64, f64);

    /// Maps every state sigma point into measurement space.
    fn transform_sigma_points(&self, state_points: &SigmaPoints) -> SigmaPoints {
        let mut z_points = DMatrix::zeros(self.dim(), state_points.ncols());
        for i in 0..state_points.ncols() {
            let point = state_points.column(i).into_owned();
            z_points.column_mut(i).copy_from(&self.predict_measurement(&point));
        }
        z_points
    }

    /// Predicted measurement sigma points together with the predicted
    /// measurement mean and innovation covariance `S` (sensor noise included).
    fn predict_moments(
        &self,
        state_points: &SigmaPoints,
        weights: &DVector<f64>,
    ) -> (SigmaPoints, Moments) {
        let z_points = self.transform_sigma_points(state_points);
        let mut moments = points_to_moments(&z_points, weights, self.angle_index());
        moments.covariance += self.get_r();
        (z_points, moments)
    }
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn Measurement>`.
dyn_clone::clone_trait_object!(Measurement);

pub mod lidar;
pub mod radar;
