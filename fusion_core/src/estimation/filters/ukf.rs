// fusion_core/src/estimation/filters/ukf.rs

use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use tracing::{debug, info, warn};

// --- Core Library Imports ---
use crate::config::UkfConfig;
use crate::error::EstimationError;
use crate::estimation::unscented::{
    augmented_sigma_points, correct, cross_covariance, points_to_moments, sigma_points,
    sigma_weights, Correction, Moments,
};
use crate::estimation::StateEstimator;
use crate::messages::{MeasurementMessage, SensorKind};
use crate::models::dynamics::{ctrv::CtrvModel, EstimationDynamics};
use crate::models::measurement::{lidar::LidarModel, radar::RadarModel, Measurement};
use crate::state::FilterState;
use crate::types::{sigma_spread, Covariance, SigmaPoints, State, N_X};
use crate::utils::angles::normalize_angle;

/// Microseconds per second, for converting timestamp deltas.
const MICROS_PER_SECOND: f64 = 1e6;

/// Predicted belief together with the sigma points it was recombined from.
#[derive(Debug, Clone)]
struct Prediction {
    moments: Moments,
    sigma_points: SigmaPoints,
}

/// An Unscented Kalman Filter tracking a single object with the CTRV model,
/// fusing lidar position fixes and radar range/bearing/range-rate fixes.
///
/// The filter starts uninitialized. The first measurement of either sensor
/// seeds the position; every later one runs a predict step (if time advanced)
/// followed by a correction with the matching sensor model, if that sensor is
/// enabled.
#[derive(Debug, Clone)]
pub struct UnscentedKalmanFilter {
    state: FilterState,
    config: UkfConfig,
    dynamics_model: Box<dyn EstimationDynamics>,
    lidar_model: Box<dyn Measurement>,
    radar_model: Box<dyn Measurement>,

    // --- UKF-specific internal state ---
    /// Weights of the augmented sigma points, shared by mean and covariance.
    weights: DVector<f64>,
    /// Predicted (unaugmented) sigma points of the latest predict step.
    predicted_sigma_points: SigmaPoints,
    /// Whether `predicted_sigma_points` still describe the current belief.
    /// A correction moves the belief away from them.
    sigma_points_current: bool,
    is_initialized: bool,
    nis: HashMap<SensorKind, f64>,
}

impl UnscentedKalmanFilter {
    /// Validates `config` and builds an uninitialized filter.
    pub fn new(config: UkfConfig) -> Result<Self, EstimationError> {
        config.validate()?;

        let dynamics_model: Box<dyn EstimationDynamics> = Box::new(CtrvModel::default());
        let n_aug = dynamics_model.state_dim() + dynamics_model.noise_dim();

        Ok(Self {
            state: FilterState::new(&config.initial_covariance_diagonal),
            lidar_model: Box::new(LidarModel::new(&config.lidar)),
            radar_model: Box::new(RadarModel::new(&config.radar)),
            weights: sigma_weights(n_aug),
            predicted_sigma_points: DMatrix::zeros(dynamics_model.state_dim(), 2 * n_aug + 1),
            dynamics_model,
            sigma_points_current: false,
            is_initialized: false,
            nis: HashMap::new(),
            config,
        })
    }

    // --- Accessors ---

    pub fn config(&self) -> &UkfConfig {
        &self.config
    }

    /// The current mean `[px, py, v, yaw, yaw_rate]`.
    pub fn vector(&self) -> &State {
        &self.state.vector
    }

    /// The current covariance `P`.
    pub fn covariance(&self) -> &Covariance {
        &self.state.covariance
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    pub fn predicted_sigma_points(&self) -> &SigmaPoints {
        &self.predicted_sigma_points
    }

    pub fn is_enabled(&self, sensor: SensorKind) -> bool {
        match sensor {
            SensorKind::Lidar => self.config.use_lidar,
            SensorKind::Radar => self.config.use_radar,
        }
    }

    /// The `2 * n_x + 1` non-augmented sigma points of the current belief.
    ///
    /// A diagnostic helper; the predict/update cycle uses augmented points.
    pub fn sigma_points(&self) -> Result<SigmaPoints, EstimationError> {
        sigma_points(&self.current_moments(), sigma_spread(N_X))
    }

    fn model(&self, sensor: SensorKind) -> &dyn Measurement {
        match sensor {
            SensorKind::Lidar => self.lidar_model.as_ref(),
            SensorKind::Radar => self.radar_model.as_ref(),
        }
    }

    fn current_moments(&self) -> Moments {
        Moments {
            mean: self.state.vector.clone(),
            covariance: self.state.covariance.clone(),
        }
    }

    // --- Public Filter Steps ---

    /// Advances the belief by `dt` seconds. A zero `dt` leaves it untouched;
    /// a negative or non-finite one is rejected.
    pub fn predict(&mut self, dt: f64) -> Result<(), EstimationError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EstimationError::InvalidTimeStep { dt });
        }
        if dt == 0.0 {
            return Ok(());
        }
        let prediction = self.compute_prediction(dt)?;
        self.commit_prediction(prediction);
        Ok(())
    }

    /// Corrects the belief with `message`, regardless of whether its sensor is
    /// enabled. Does not advance time.
    pub fn update(&mut self, message: &MeasurementMessage) -> Result<(), EstimationError> {
        let prior = self.current_prior()?;
        let correction = self.compute_correction(&prior, message)?;
        self.commit_correction(message.sensor_kind(), correction);
        Ok(())
    }

    // --- Private Helper Methods for the UKF Algorithm ---

    fn initialize(&mut self, message: &MeasurementMessage) {
        let z = message.data.as_vector();
        let (px, py) = self.model(message.sensor_kind()).initial_position(&z);

        self.state.vector[0] = px;
        self.state.vector[1] = py;
        self.state.last_update_timestamp = message.timestamp_us;
        self.is_initialized = true;

        info!(
            sensor = %message.sensor_kind(),
            px,
            py,
            timestamp_us = message.timestamp_us,
            "filter initialized"
        );
    }

    /// Augment, propagate through the dynamics and recombine.
    fn compute_prediction(&self, dt: f64) -> Result<Prediction, EstimationError> {
        // --- 1. Generate augmented sigma points ---
        let augmented = augmented_sigma_points(
            &self.state.vector,
            &self.state.covariance,
            &[self.config.std_a, self.config.std_yawdd],
        )?;

        // --- 2. Propagate each point through the non-linear dynamics model ---
        let sigma_points = self.dynamics_model.propagate_sigma_points(&augmented, dt);

        // --- 3. Recover the predicted mean and covariance ---
        let angle_index = self.dynamics_model.angle_index();
        let mut moments = points_to_moments(&sigma_points, &self.weights, angle_index);
        if let Some(idx) = angle_index {
            moments.mean[idx] = normalize_angle(moments.mean[idx]);
        }

        Ok(Prediction {
            moments,
            sigma_points,
        })
    }

    /// The belief and the sigma points a correction should be computed against.
    ///
    /// After a correction the retained sigma points are stale; they are
    /// regenerated by propagating the current belief over zero time, which
    /// leaves the mean and covariance unchanged.
    fn current_prior(&self) -> Result<Prediction, EstimationError> {
        let sigma_points = if self.sigma_points_current {
            self.predicted_sigma_points.clone()
        } else {
            self.compute_prediction(0.0)?.sigma_points
        };
        Ok(Prediction {
            moments: self.current_moments(),
            sigma_points,
        })
    }

    fn compute_correction(
        &self,
        prior: &Prediction,
        message: &MeasurementMessage,
    ) -> Result<Correction, EstimationError> {
        let sensor = message.sensor_kind();
        let model = self.model(sensor);
        let state_angle = self.dynamics_model.angle_index();

        // --- 1. Predicted measurement and innovation covariance S ---
        let (z_points, z_moments) = model.predict_moments(&prior.sigma_points, &self.weights);

        // --- 2. Cross-covariance between state and measurement space ---
        let tc = cross_covariance(
            &prior.sigma_points,
            &prior.moments.mean,
            state_angle,
            &z_points,
            &z_moments.mean,
            model.angle_index(),
            &self.weights,
        );

        // --- 3. Kalman gain and correction ---
        correct(
            &prior.moments,
            &z_moments,
            &tc,
            &message.data.as_vector(),
            state_angle,
            model.angle_index(),
        )
        .ok_or(EstimationError::SingularInnovation { sensor })
    }

    fn commit_prediction(&mut self, prediction: Prediction) {
        self.state.vector = prediction.moments.mean;
        self.state.covariance = prediction.moments.covariance;
        self.predicted_sigma_points = prediction.sigma_points;
        self.sigma_points_current = true;
    }

    fn commit_correction(&mut self, sensor: SensorKind, correction: Correction) {
        debug!(sensor = %sensor, nis = correction.nis, "measurement fused");
        self.state.vector = correction.mean;
        self.state.covariance = correction.covariance;
        self.nis.insert(sensor, correction.nis);
        self.sigma_points_current = false;
    }

    /// One full cycle. Everything is computed on locals first so that an
    /// error leaves the filter exactly as it was.
    fn run_cycle(&mut self, message: &MeasurementMessage) -> Result<(), EstimationError> {
        let sensor = message.sensor_kind();
        let previous_us = self.state.last_update_timestamp;
        if message.timestamp_us < previous_us {
            return Err(EstimationError::OutOfOrder {
                previous_us,
                current_us: message.timestamp_us,
            });
        }
        let dt = (message.timestamp_us - previous_us) as f64 / MICROS_PER_SECOND;

        // --- 1. PREDICT: advance to the time of the measurement ---
        let prediction = if dt > 0.0 {
            Some(self.compute_prediction(dt)?)
        } else {
            None
        };

        // --- 2. UPDATE: fuse the measurement if its sensor is enabled ---
        let correction = if self.is_enabled(sensor) {
            let refreshed;
            let prior = match &prediction {
                Some(p) => p,
                None => {
                    refreshed = self.current_prior()?;
                    &refreshed
                }
            };
            Some(self.compute_correction(prior, message)?)
        } else {
            None
        };

        debug!(
            sensor = %sensor,
            dt,
            corrected = correction.is_some(),
            "processing measurement"
        );

        // --- 3. Commit ---
        if let Some(prediction) = prediction {
            self.commit_prediction(prediction);
        }
        if let Some(correction) = correction {
            self.commit_correction(sensor, correction);
        }
        self.state.last_update_timestamp = message.timestamp_us;
        Ok(())
    }
}

// --- The Public Trait Implementation ---
impl StateEstimator for UnscentedKalmanFilter {
    fn process(&mut self, message: &MeasurementMessage) -> Result<(), EstimationError> {
        if !self.is_initialized {
            self.initialize(message);
            return Ok(());
        }

        self.run_cycle(message).map_err(|e| {
            warn!(
                sensor = %message.sensor_kind(),
                timestamp_us = message.timestamp_us,
                error = %e,
                "measurement rejected"
            );
            e
        })
    }

    fn get_state(&self) -> &FilterState {
        &self.state
    }

    fn nis(&self, sensor: SensorKind) -> f64 {
        self.nis.get(&sensor).copied().unwrap_or(0.0)
    }

    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}
