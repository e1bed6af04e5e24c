// fusion_sim/src/simulation/mod.rs

use fusion_core::messages::MeasurementMessage;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod core;
pub mod evaluation;
pub mod replay;
pub mod runner;
pub mod sensors;
pub mod truth;

/// Ground-truth kinematics at the time of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthSample {
    pub px: f64,
    pub py: f64,
    pub vx: f64,
    pub vy: f64,
}

/// One measurement as handed to the filter, plus the truth behind it when
/// the source knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub message: MeasurementMessage,
    pub truth: Option<TruthSample>,
}
