// fusion_core/src/messages.rs

use crate::error::EstimationError;
use nalgebra::{DVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================================
// == Sensor Identification ==
// =========================================================================

/// The two sensor modalities the tracker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Cartesian position fix `[px, py]`.
    Lidar,
    /// Polar fix `[range, bearing, range_rate]`.
    Radar,
}

impl SensorKind {
    /// Length of the raw reading produced by this sensor.
    pub fn measurement_dim(self) -> usize {
        match self {
            SensorKind::Lidar => 2,
            SensorKind::Radar => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Lidar => write!(f, "lidar"),
            SensorKind::Radar => write!(f, "radar"),
        }
    }
}

// =========================================================================
// == Core Message and Data Enums ==
// =========================================================================

/// A self-describing container for a single sensor reading.
///
/// The variant fixes both the sensor type and the size of the reading, so a
/// well-formed message can never carry a reading of the wrong length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeasurementData {
    /// `[px, py]` in meters.
    Lidar(Vector2<f64>),
    /// `[rho, phi, rho_dot]` in meters, radians and meters per second.
    Radar(Vector3<f64>),
}

impl MeasurementData {
    pub fn sensor_kind(&self) -> SensorKind {
        match self {
            MeasurementData::Lidar(_) => SensorKind::Lidar,
            MeasurementData::Radar(_) => SensorKind::Radar,
        }
    }

    /// The raw reading as a dynamically sized vector `z`.
    pub fn as_vector(&self) -> DVector<f64> {
        match self {
            MeasurementData::Lidar(z) => DVector::from_column_slice(z.as_slice()),
            MeasurementData::Radar(z) => DVector::from_column_slice(z.as_slice()),
        }
    }
}

/// The timestamped record the caller hands to the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMessage {
    /// Acquisition time in microseconds. Must never decrease between calls.
    pub timestamp_us: u64,
    pub data: MeasurementData,
}

impl MeasurementMessage {
    pub fn lidar(px: f64, py: f64, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            data: MeasurementData::Lidar(Vector2::new(px, py)),
        }
    }

    pub fn radar(rho: f64, phi: f64, rho_dot: f64, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            data: MeasurementData::Radar(Vector3::new(rho, phi, rho_dot)),
        }
    }

    /// Builds a message from an untyped reading, checking that its length
    /// matches what `sensor` produces.
    pub fn from_raw(
        sensor: SensorKind,
        reading: &[f64],
        timestamp_us: u64,
    ) -> Result<Self, EstimationError> {
        let expected = sensor.measurement_dim();
        if reading.len() != expected {
            return Err(EstimationError::DimensionMismatch {
                sensor,
                expected,
                actual: reading.len(),
            });
        }

        let data = match sensor {
            SensorKind::Lidar => MeasurementData::Lidar(Vector2::from_column_slice(reading)),
            SensorKind::Radar => MeasurementData::Radar(Vector3::from_column_slice(reading)),
        };
        Ok(Self { timestamp_us, data })
    }

    pub fn sensor_kind(&self) -> SensorKind {
        self.data.sensor_kind()
    }
}
