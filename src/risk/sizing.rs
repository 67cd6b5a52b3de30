//! Position sizing from dollar risk and account percentage
//!
//! Contract count is the minimum of three independent caps:
//! - dollar cap: `max_risk_per_trade / risk_per_contract`
//! - account cap: `balance * risk_per_trade_pct / 100 / risk_per_contract`
//! - contract cap: `max_contracts_per_trade`

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::RiskLimits;
use crate::error::ConfigError;
use crate::types::Side;

/// Sizes positions against the configured limits and current balance
#[derive(Debug, Clone)]
pub struct PositionSizer {
    account_balance: Decimal,
    limits: Arc<RiskLimits>,
}

impl PositionSizer {
    /// Create a new sizer
    pub fn new(account_balance: Decimal, limits: Arc<RiskLimits>) -> Result<Self, ConfigError> {
        limits.validate()?;
        Ok(Self {
            account_balance,
            limits,
        })
    }

    pub fn account_balance(&self) -> Decimal {
        self.account_balance
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Contracts to trade for a given entry and stop.
    ///
    /// Returns 0 when entry equals stop or when any cap rounds down to zero.
    pub fn calculate_position_size(
        &self,
        entry_price: Decimal,
        stop_loss: Decimal,
        tick_size: Decimal,
        tick_value: Decimal,
        max_contracts: Option<u32>,
    ) -> u32 {
        if entry_price == stop_loss || tick_size <= Decimal::ZERO {
            return 0;
        }

        let Some(risk_per_contract) = risk_per_contract(entry_price, stop_loss, tick_size, tick_value)
        else {
            return 0;
        };
        if risk_per_contract <= Decimal::ZERO {
            return 0;
        }

        let max_by_dollar_risk = floor_contracts(self.limits.max_risk_per_trade / risk_per_contract);

        let account_risk = self.account_balance * self.limits.risk_per_trade_pct / dec!(100);
        let max_by_account_pct = floor_contracts(account_risk / risk_per_contract);

        let mut size = max_by_dollar_risk
            .min(max_by_account_pct)
            .min(i64::from(self.limits.max_contracts_per_trade));

        if let Some(cap) = max_contracts {
            size = size.min(i64::from(cap));
        }

        size.max(0) as u32
    }

    /// Stop price that risks `risk_amount` dollars on one contract
    pub fn calculate_stop_loss(
        &self,
        entry_price: Decimal,
        is_long: bool,
        risk_amount: Decimal,
        tick_size: Decimal,
        tick_value: Decimal,
    ) -> Decimal {
        let points = risk_amount / tick_value * tick_size;
        match Side::from_is_long(is_long) {
            Side::Long => entry_price - points,
            Side::Short => entry_price + points,
        }
    }

    /// Replace the balance used for sizing
    pub fn update_account_balance(&mut self, new_balance: Decimal) {
        self.account_balance = new_balance;
    }
}

fn floor_contracts(value: Decimal) -> i64 {
    value.floor().to_i64().unwrap_or(i64::MAX)
}

/// Dollar risk of one contract between entry and stop.
///
/// `None` when `tick_size` is not positive or the result overflows.
pub fn risk_per_contract(
    entry_price: Decimal,
    stop_loss: Decimal,
    tick_size: Decimal,
    tick_value: Decimal,
) -> Option<Decimal> {
    if tick_size <= Decimal::ZERO {
        return None;
    }
    (entry_price - stop_loss)
        .abs()
        .checked_div(tick_size)?
        .checked_mul(tick_value)
}

/// Risk profile of a single proposed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRiskMetrics {
    pub instrument: String,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub quantity: u32,
    pub tick_size: Decimal,
    pub tick_value: Decimal,
}

impl TradeRiskMetrics {
    /// Dollar risk per contract
    pub fn risk_per_contract(&self) -> Option<Decimal> {
        risk_per_contract(self.entry_price, self.stop_loss, self.tick_size, self.tick_value)
    }

    /// Dollar risk for the whole trade
    pub fn total_risk(&self) -> Option<Decimal> {
        self.risk_per_contract()?
            .checked_mul(Decimal::from(self.quantity))
    }
}

/// Reward over risk; 0 when the stop sits on the entry
pub fn risk_reward_ratio(entry: Decimal, stop: Decimal, target: Decimal) -> Decimal {
    let risk = (entry - stop).abs();
    if risk.is_zero() {
        return Decimal::ZERO;
    }
    (target - entry).abs() / risk
}

/// Notional dollar value of a position
pub fn position_value(
    quantity: u32,
    price: Decimal,
    tick_size: Decimal,
    tick_value: Decimal,
) -> Decimal {
    Decimal::from(quantity) * (price / tick_size) * tick_value
}

/// Dollar value of a move in points
pub fn points_to_dollars(
    points: Decimal,
    quantity: u32,
    tick_size: Decimal,
    tick_value: Decimal,
) -> Decimal {
    Decimal::from(quantity) * (points / tick_size) * tick_value
}
