// fusion_sim/src/prelude.rs

pub use crate::cli::Cli;
pub use crate::error::SimError;
pub use crate::simulation::config::{load_scenario, scenario_paths, ScenarioConfig};
pub use crate::simulation::evaluation::RunReport;
pub use crate::simulation::runner::run_scenario;
pub use crate::simulation::Record;
