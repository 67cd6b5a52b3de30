//! Strategy orchestration
//!
//! Wires the risk gate, position sizer and breakeven manager between a market
//! feed and an order gateway

mod orchestrator;
mod types;

pub use orchestrator::Strategy;
pub use types::{StrategyEvent, StrategyStats};
