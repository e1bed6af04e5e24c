// fusion_sim/src/lib.rs

//! Drivers around `fusion_core`: scenario configuration, synthetic and
//! replayed measurement sources, evaluation against ground truth and reports.

pub mod cli;
pub mod error;
pub mod prelude;
pub mod simulation;
