//! tradeguard: risk gating, position sizing and auto-breakeven stop management
//! for futures trading strategies
//!
//! This library provides the core components for:
//! - Pre-trade risk checks with daily/total loss shutdown and loss cool-downs
//! - Position sizing from dollar risk and account percentage
//! - Multi-step breakeven stops with tick-based trailing
//! - A momentum entry strategy wiring the above to a feed and an order gateway
//! - Paper execution and deterministic price-path simulation
//! - Structured logging and Prometheus metrics

pub mod breakeven;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod feed;
pub mod risk;
pub mod signal;
pub mod sim;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use error::ConfigError;
pub use types::{InstrumentSpec, Side};
