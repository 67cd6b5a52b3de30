//! Risk limits and trading-hours window

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Static risk limits, fixed for the lifetime of a strategy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Maximum contracts in a single order
    pub max_contracts_per_trade: u32,
    /// Maximum open contracts across all instruments
    pub max_total_contracts: u32,
    /// Maximum distinct instruments held at once
    pub max_instruments: usize,
    /// Maximum dollar risk for one trade
    pub max_risk_per_trade: Decimal,
    /// Daily loss that shuts trading down
    pub max_daily_loss: Decimal,
    /// Cumulative loss that shuts trading down
    pub max_total_loss: Decimal,
    /// Stop taking trades once daily P&L reaches this
    pub daily_profit_target: Option<Decimal>,
    /// Hard cap on daily profit
    pub max_daily_profit: Option<Decimal>,
    /// Percent of account balance risked per trade
    pub risk_per_trade_pct: Decimal,
    /// Maximum percent of account in one position
    pub max_position_size_pct: Decimal,
    /// Start of the trading window (local time)
    pub trading_start: Option<NaiveTime>,
    /// End of the trading window (local time)
    pub trading_end: Option<NaiveTime>,
    /// Losses in a row before the cool-down applies
    pub max_consecutive_losses: u32,
    /// Cool-down after the consecutive-loss limit, in seconds
    pub cool_down_secs: u64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_contracts_per_trade: 3,
            max_total_contracts: 10,
            max_instruments: 5,
            max_risk_per_trade: dec!(100),
            max_daily_loss: dec!(500),
            max_total_loss: dec!(2000),
            daily_profit_target: None,
            max_daily_profit: None,
            risk_per_trade_pct: dec!(1),
            max_position_size_pct: dec!(10),
            trading_start: None,
            trading_end: None,
            max_consecutive_losses: 3,
            cool_down_secs: 300,
        }
    }
}

impl RiskLimits {
    /// Check the limit invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_risk_per_trade", self.max_risk_per_trade)?;
        positive("max_daily_loss", self.max_daily_loss)?;
        positive("max_total_loss", self.max_total_loss)?;
        percent("risk_per_trade_pct", self.risk_per_trade_pct)?;
        percent("max_position_size_pct", self.max_position_size_pct)?;

        if self.trading_start.is_some() != self.trading_end.is_some() {
            return Err(ConfigError::IncompleteTradingWindow);
        }
        Ok(())
    }

    /// Configured trading window as `(start, end)`
    pub fn trading_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        self.trading_start.zip(self.trading_end)
    }

    /// Set the trading window
    pub fn with_trading_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.trading_start = Some(start);
        self.trading_end = Some(end);
        self
    }

    /// Whether `time` falls inside the trading window.
    ///
    /// Windows with `start >= end` wrap midnight. Without a window every
    /// time is tradeable.
    pub fn is_trading_time(&self, time: NaiveTime) -> bool {
        match self.trading_window() {
            None => true,
            Some((start, end)) if start < end => start <= time && time <= end,
            Some((start, end)) => time >= start || time <= end,
        }
    }
}

fn positive(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn percent(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO || value > dec!(100) {
        return Err(ConfigError::PercentOutOfRange { field, value });
    }
    Ok(())
}
