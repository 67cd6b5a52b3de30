//! Risk gate decisions and reasons

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why trading was shut down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownReason {
    /// Daily P&L reached `-max_daily_loss`
    DailyLossLimit,
    /// Total P&L reached `-max_total_loss`
    TotalLossLimit,
    /// Disabled by the operator or orchestrator
    Manual(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::DailyLossLimit => write!(f, "Daily loss limit reached"),
            ShutdownReason::TotalLossLimit => write!(f, "Total loss limit reached"),
            ShutdownReason::Manual(reason) => write!(f, "{reason}"),
        }
    }
}

/// Reason a proposed trade was rejected by the risk gate
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DenialReason {
    /// Trading is shut down
    #[error("Trading disabled: {0}")]
    TradingDisabled(ShutdownReason),
    /// Outside the configured trading window
    #[error("Outside trading hours")]
    OutsideTradingHours,
    /// Daily loss limit breached (trips shutdown)
    #[error("Daily loss limit reached")]
    DailyLossLimit,
    /// Total loss limit breached (trips shutdown)
    #[error("Total loss limit reached")]
    TotalLossLimit,
    /// Daily profit target met
    #[error("Daily profit target reached")]
    DailyProfitTarget,
    /// Daily profit cap met
    #[error("Max daily profit reached")]
    MaxDailyProfit,
    /// Consecutive-loss cool-down still running
    #[error("Cool-down period: {remaining_secs}s remaining")]
    CoolDown { remaining_secs: i64 },
    /// Would exceed max open contracts
    #[error("Total contracts limit ({limit}) would be exceeded")]
    TotalContractsExceeded { limit: u32 },
    /// Order larger than max contracts per trade
    #[error("Trade size exceeds max contracts per trade ({limit})")]
    ContractsPerTradeExceeded { limit: u32 },
    /// Would open one instrument too many
    #[error("Max instruments limit ({limit}) reached")]
    MaxInstruments { limit: usize },
    /// Dollar risk above max risk per trade
    #[error("Trade risk ${risk:.2} exceeds limit ${limit:.2}")]
    RiskPerTradeExceeded { risk: Decimal, limit: Decimal },
    /// Position sizer produced zero contracts
    #[error("Calculated position size is 0 - risk too high")]
    ZeroPositionSize,
    /// Tick size or tick value was not positive
    #[error("Invalid instrument: tick size {tick_size}, tick value {tick_value}")]
    InvalidInstrument { tick_size: Decimal, tick_value: Decimal },
    /// Previous entry was too recent
    #[error("Trade throttled: {remaining_secs}s until next entry")]
    TradeThrottled { remaining_secs: i64 },
}

impl DenialReason {
    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            DenialReason::TradingDisabled(_) => "trading_disabled",
            DenialReason::OutsideTradingHours => "outside_trading_hours",
            DenialReason::DailyLossLimit => "daily_loss_limit",
            DenialReason::TotalLossLimit => "total_loss_limit",
            DenialReason::DailyProfitTarget => "daily_profit_target",
            DenialReason::MaxDailyProfit => "max_daily_profit",
            DenialReason::CoolDown { .. } => "cool_down",
            DenialReason::TotalContractsExceeded { .. } => "total_contracts",
            DenialReason::ContractsPerTradeExceeded { .. } => "contracts_per_trade",
            DenialReason::MaxInstruments { .. } => "max_instruments",
            DenialReason::RiskPerTradeExceeded { .. } => "risk_per_trade",
            DenialReason::ZeroPositionSize => "zero_position_size",
            DenialReason::InvalidInstrument { .. } => "invalid_instrument",
            DenialReason::TradeThrottled { .. } => "trade_throttled",
        }
    }
}

/// Outcome of a risk-gate check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDecision {
    Allowed,
    Denied(DenialReason),
}

impl TradeDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TradeDecision::Allowed)
    }

    /// Human-readable reason, "Trade allowed" when allowed
    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn denial(&self) -> Option<&DenialReason> {
        match self {
            TradeDecision::Allowed => None,
            TradeDecision::Denied(reason) => Some(reason),
        }
    }
}

impl fmt::Display for TradeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDecision::Allowed => write!(f, "Trade allowed"),
            TradeDecision::Denied(reason) => write!(f, "{reason}"),
        }
    }
}

/// Risk level derived from daily loss usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}
