//! Deterministic price-path simulation
//!
//! Replays a price path through the strategy against the paper broker

mod report;
mod simulator;

pub use report::SimulationReport;
pub use simulator::{sample_path, Simulator};
