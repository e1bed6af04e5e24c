// fusion_core/src/config.rs

//! Construction-time parameters of the tracker.
//!
//! The measurement noise values are supplied by the sensor manufacturer and are
//! not meant to be tuned; the process noise values are the filter's tuning knobs.

use crate::error::EstimationError;
use crate::types::N_X;
use serde::{Deserialize, Serialize};

/// Lidar measurement noise standard deviations, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarNoise {
    pub std_px: f64,
    pub std_py: f64,
}

impl Default for LidarNoise {
    fn default() -> Self {
        Self {
            std_px: 0.15,
            std_py: 0.15,
        }
    }
}

/// Radar measurement noise standard deviations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarNoise {
    /// Range noise in meters.
    pub std_r: f64,
    /// Bearing noise in radians.
    pub std_phi: f64,
    /// Range-rate noise in meters per second.
    pub std_rdot: f64,
}

impl Default for RadarNoise {
    fn default() -> Self {
        Self {
            std_r: 0.3,
            std_phi: 0.03,
            std_rdot: 0.3,
        }
    }
}

/// Full configuration of an `UnscentedKalmanFilter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UkfConfig {
    /// If false, lidar readings only seed the state; they are never fused.
    pub use_lidar: bool,
    /// If false, radar readings only seed the state; they are never fused.
    pub use_radar: bool,
    /// Process noise: longitudinal acceleration std in m/s^2.
    pub std_a: f64,
    /// Process noise: yaw acceleration std in rad/s^2.
    pub std_yawdd: f64,
    pub lidar: LidarNoise,
    pub radar: RadarNoise,
    /// Diagonal of the covariance the filter starts from.
    pub initial_covariance_diagonal: [f64; N_X],
}

impl Default for UkfConfig {
    fn default() -> Self {
        Self {
            use_lidar: true,
            use_radar: true,
            std_a: 2.0,
            std_yawdd: 0.2,
            lidar: LidarNoise::default(),
            radar: RadarNoise::default(),
            initial_covariance_diagonal: [1.0; N_X],
        }
    }
}

impl UkfConfig {
    /// Rejects any standard deviation or variance that is not strictly positive.
    pub fn validate(&self) -> Result<(), EstimationError> {
        let scalars: [(&'static str, f64); 7] = [
            ("std_a", self.std_a),
            ("std_yawdd", self.std_yawdd),
            ("lidar.std_px", self.lidar.std_px),
            ("lidar.std_py", self.lidar.std_py),
            ("radar.std_r", self.radar.std_r),
            ("radar.std_phi", self.radar.std_phi),
            ("radar.std_rdot", self.radar.std_rdot),
        ];
        for (name, value) in scalars {
            check_positive(name, value)?;
        }

        for value in self.initial_covariance_diagonal {
            check_positive("initial_covariance_diagonal", value)?;
        }
        Ok(())
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), EstimationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EstimationError::InvalidConfig { name, value })
    }
}
