// fusion_core/src/estimation/mod.rs

use crate::error::EstimationError;
use crate::messages::{MeasurementMessage, SensorKind};
use crate::state::FilterState;

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of a single tracked object.
pub trait StateEstimator: Send + Sync {
    /// Folds one measurement into the belief. Measurements must arrive in
    /// non-decreasing timestamp order.
    fn process(&mut self, message: &MeasurementMessage) -> Result<(), EstimationError>;

    /// Returns a reference to the current best estimate of the state.
    fn get_state(&self) -> &FilterState;

    /// Normalized innovation squared of the latest correction from `sensor`,
    /// or zero if that sensor has not been fused yet.
    fn nis(&self, sensor: SensorKind) -> f64;

    /// Whether the first measurement has been consumed.
    fn is_initialized(&self) -> bool;
}

pub mod consistency;
pub mod filters;
pub mod unscented;
