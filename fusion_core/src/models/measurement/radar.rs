// fusion_core/src/models/measurement/radar.rs

use crate::config::RadarNoise;
use crate::messages::SensorKind;
use crate::models::measurement::Measurement;
use crate::state::StateVariable;
use nalgebra::{DMatrix, DVector};

/// Radar observes range, bearing and range rate relative to the sensor origin.
///
/// The range rate divides by the range, so a state exactly at the origin
/// yields NaN. Callers must keep the tracked object off the sensor origin.
#[derive(Debug, Clone)]
pub struct RadarModel {
    pub noise_covariance: DMatrix<f64>,
}

impl RadarModel {
    /// Row of the bearing inside the measurement vector.
    pub const BEARING_INDEX: usize = 1;

    pub fn new(noise: &RadarNoise) -> Self {
        Self {
            noise_covariance: DMatrix::from_diagonal(&DVector::from_vec(vec![
                noise.std_r.powi(2),
                noise.std_phi.powi(2),
                noise.std_rdot.powi(2),
            ])),
        }
    }
}

impl Measurement for RadarModel {
    fn sensor_kind(&self) -> SensorKind {
        SensorKind::Radar
    }

    fn get_r(&self) -> &DMatrix<f64> {
        &self.noise_covariance
    }

    fn angle_index(&self) -> Option<usize> {
        Some(Self::BEARING_INDEX)
    }

    fn predict_measurement(&self, state: &DVector<f64>) -> DVector<f64> {
        let p_x = state[StateVariable::Px.index()];
        let p_y = state[StateVariable::Py.index()];
        let v = state[StateVariable::V.index()];
        let yaw = state[StateVariable::Yaw.index()];

        let v1 = yaw.cos() * v;
        let v2 = yaw.sin() * v;
        let rho = (p_x * p_x + p_y * p_y).sqrt();

        DVector::from_vec(vec![rho, p_y.atan2(p_x), (p_x * v1 + p_y * v2) / rho])
    }

    fn initial_position(&self, z: &DVector<f64>) -> (f64, f64) {
        let rho = z[0];
        let phi = z[Self::BEARING_INDEX];
        (rho * phi.cos(), rho * phi.sin())
    }
}
