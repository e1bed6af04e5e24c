// fusion_core/src/models/measurement/lidar.rs

use crate::config::LidarNoise;
use crate::messages::SensorKind;
use crate::models::measurement::Measurement;
use crate::state::StateVariable;
use nalgebra::{DMatrix, DVector};

/// Lidar observes the Cartesian position directly.
#[derive(Debug, Clone)] // Make sure it's cloneable for the dyn-clone
pub struct LidarModel {
    // The R matrix for this sensor
    pub noise_covariance: DMatrix<f64>,
}

impl LidarModel {
    pub fn new(noise: &LidarNoise) -> Self {
        Self {
            noise_covariance: DMatrix::from_diagonal(&DVector::from_vec(vec![
                noise.std_px.powi(2),
                noise.std_py.powi(2),
            ])),
        }
    }
}

impl Measurement for LidarModel {
    fn sensor_kind(&self) -> SensorKind {
        SensorKind::Lidar
    }

    fn get_r(&self) -> &DMatrix<f64> {
        &self.noise_covariance
    }

    fn predict_measurement(&self, state: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![
            state[StateVariable::Px.index()],
            state[StateVariable::Py.index()],
        ])
    }

    fn initial_position(&self, z: &DVector<f64>) -> (f64, f64) {
        (z[0], z[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::unscented::sigma_weights;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_noise_covariance() {
        let model = LidarModel::new(&LidarNoise::default());
        assert_abs_diff_eq!(model.get_r()[(0, 0)], 0.0225, epsilon = 1e-12);
        assert_abs_diff_eq!(model.get_r()[(1, 1)], 0.0225, epsilon = 1e-12);
        assert_eq!(model.get_r()[(0, 1)], 0.0);
    }

    #[test]
    fn test_projects_position() {
        let model = LidarModel::new(&LidarNoise::default());
        let x = DVector::from_vec(vec![1.5, -2.0, 3.0, 0.1, 0.0]);
        let z = model.predict_measurement(&x);
        assert_eq!(z.as_slice(), &[1.5, -2.0]);
        assert_eq!(model.initial_position(&z), (1.5, -2.0));
    }

    #[test]
    fn test_predict_moments_adds_noise() {
        let model = LidarModel::new(&LidarNoise::default());
        // All sigma points at the same state: spread comes from R alone.
        let points = DMatrix::from_fn(5, 15, |r, _| r as f64);
        let (z_points, moments) = model.predict_moments(&points, &sigma_weights(7));
        assert_eq!(z_points.shape(), (2, 15));
        assert_abs_diff_eq!(moments.mean[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moments.mean[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moments.covariance, model.get_r().clone(), epsilon = 1e-12);
    }
}
