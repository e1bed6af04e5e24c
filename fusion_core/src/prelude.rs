// fusion_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::StateEstimator;
pub use crate::messages::{MeasurementData, MeasurementMessage, SensorKind};
pub use crate::models::dynamics::EstimationDynamics;
pub use crate::models::measurement::Measurement;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{LidarNoise, RadarNoise, UkfConfig};
pub use crate::error::EstimationError;
pub use crate::state::{FilterState, StateVariable};

// --- Estimation Algorithms ---
pub use crate::estimation::consistency::{NisMonitor, NisSummary};
pub use crate::estimation::filters::ukf::UnscentedKalmanFilter;

// --- Concrete Model Implementations (Export common ones for convenience) ---
pub use crate::models::dynamics::ctrv::CtrvModel;
pub use crate::models::measurement::{lidar::LidarModel, radar::RadarModel};
