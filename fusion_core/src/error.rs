// fusion_core/src/error.rs

use crate::messages::SensorKind;
use thiserror::Error;

/// Everything that can go wrong while configuring or running the filter.
///
/// A cycle that returns one of these leaves the estimator exactly as it was
/// before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    /// A noise standard deviation or initial covariance entry is not a
    /// strictly positive, finite number.
    #[error("invalid configuration: `{name}` must be positive and finite, got {value}")]
    InvalidConfig { name: &'static str, value: f64 },

    /// The augmented covariance could not be Cholesky-factorized.
    #[error("augmented covariance is not positive definite")]
    NotPositiveDefinite,

    /// The predicted measurement covariance `S` could not be inverted.
    #[error("innovation covariance for {sensor} is singular")]
    SingularInnovation { sensor: SensorKind },

    /// The measurement is older than the last one the filter consumed.
    #[error("measurement at {current_us} us is older than the last processed one at {previous_us} us")]
    OutOfOrder { previous_us: u64, current_us: u64 },

    /// A prediction was asked for over a negative or non-finite interval.
    #[error("cannot predict over a time step of {dt} s")]
    InvalidTimeStep { dt: f64 },

    /// The raw reading does not have the length required by its sensor type.
    #[error("{sensor} reading must have {expected} components, got {actual}")]
    DimensionMismatch {
        sensor: SensorKind,
        expected: usize,
        actual: usize,
    },
}
