//! Risk management module
//!
//! Static limits, position sizing, and the stateful trade gate

mod limits;
mod manager;
mod sizing;
mod types;

pub use limits::RiskLimits;
pub use manager::{RiskEvent, RiskManager, RiskMetrics};
pub use sizing::{
    points_to_dollars, position_value, risk_per_contract, risk_reward_ratio, PositionSizer,
    TradeRiskMetrics,
};
pub use types::{DenialReason, RiskLevel, ShutdownReason, TradeDecision};
