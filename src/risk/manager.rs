//! Stateful risk gate
//!
//! Tracks P&L, open contracts and loss streaks for one strategy run and
//! decides whether a proposed trade may be taken. Loss-limit breaches trip a
//! shutdown that only `enable_trading` undoes.
//!
//! Not internally synchronized: callers serialize access to one instance.

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::sizing::risk_per_contract;
use super::types::{DenialReason, RiskLevel, ShutdownReason, TradeDecision};
use super::RiskLimits;
use crate::error::ConfigError;
use crate::types::Side;

/// Notification raised by the risk manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskEvent {
    /// A risk threshold was hit without shutting trading down
    RiskViolation { message: String, level: RiskLevel },
    /// Trading was shut down
    LimitReached { reason: ShutdownReason },
}

/// Point-in-time view of the risk state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub trading_enabled: bool,
    pub risk_level: RiskLevel,
    pub daily_pnl: Decimal,
    pub total_pnl: Decimal,
    pub daily_trades: u32,
    pub total_trades: u32,
    pub consecutive_losses: u32,
    pub active_instruments: usize,
    pub total_contracts: u32,
    pub daily_loss_used_pct: Decimal,
}

/// Risk gate for a single strategy run
#[derive(Debug)]
pub struct RiskManager {
    limits: Arc<RiskLimits>,
    initial_balance: Decimal,
    daily_pnl: Decimal,
    total_pnl: Decimal,
    daily_trades: u32,
    total_trades: u32,
    consecutive_losses: u32,
    last_loss_time: Option<DateTime<Local>>,
    active_positions: HashMap<String, u32>,
    total_contracts: u32,
    trading_enabled: bool,
    shutdown_reason: Option<ShutdownReason>,
    events: Vec<RiskEvent>,
}

impl RiskManager {
    /// Create a risk manager, validating the limits
    pub fn new(limits: Arc<RiskLimits>, initial_balance: Decimal) -> Result<Self, ConfigError> {
        limits.validate()?;
        Ok(Self {
            limits,
            initial_balance,
            daily_pnl: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
            daily_trades: 0,
            total_trades: 0,
            consecutive_losses: 0,
            last_loss_time: None,
            active_positions: HashMap::new(),
            total_contracts: 0,
            trading_enabled: true,
            shutdown_reason: None,
            events: Vec::new(),
        })
    }

    /// Check whether a trade of `quantity` contracts on `instrument` is allowed now
    pub fn can_trade(&mut self, instrument: &str, quantity: u32) -> TradeDecision {
        self.can_trade_at(instrument, quantity, Local::now())
    }

    /// Check whether a trade is allowed at `now`.
    ///
    /// Checks run in a fixed order and stop at the first failure. Loss-limit
    /// breaches also shut trading down.
    pub fn can_trade_at(
        &mut self,
        instrument: &str,
        quantity: u32,
        now: DateTime<Local>,
    ) -> TradeDecision {
        if !self.trading_enabled {
            let reason = self
                .shutdown_reason
                .clone()
                .unwrap_or_else(|| ShutdownReason::Manual("unknown".to_string()));
            return TradeDecision::Denied(DenialReason::TradingDisabled(reason));
        }

        if !self.limits.is_trading_time(now.time()) {
            return TradeDecision::Denied(DenialReason::OutsideTradingHours);
        }

        if self.daily_pnl <= -self.limits.max_daily_loss {
            self.trigger_shutdown(ShutdownReason::DailyLossLimit);
            return TradeDecision::Denied(DenialReason::DailyLossLimit);
        }

        if self.total_pnl <= -self.limits.max_total_loss {
            self.trigger_shutdown(ShutdownReason::TotalLossLimit);
            return TradeDecision::Denied(DenialReason::TotalLossLimit);
        }

        if let Some(target) = self.limits.daily_profit_target {
            if self.daily_pnl >= target {
                return TradeDecision::Denied(DenialReason::DailyProfitTarget);
            }
        }

        if let Some(cap) = self.limits.max_daily_profit {
            if self.daily_pnl >= cap {
                return TradeDecision::Denied(DenialReason::MaxDailyProfit);
            }
        }

        if self.consecutive_losses >= self.limits.max_consecutive_losses {
            if let Some(last_loss) = self.last_loss_time {
                let cool_down_ms = i64::try_from(self.limits.cool_down_secs)
                    .unwrap_or(i64::MAX)
                    .saturating_mul(1000);
                let elapsed_ms = (now - last_loss).num_milliseconds();
                if elapsed_ms < cool_down_ms {
                    return TradeDecision::Denied(DenialReason::CoolDown {
                        remaining_secs: (cool_down_ms - elapsed_ms) / 1000,
                    });
                }
            }
        }

        if self.total_contracts.saturating_add(quantity) > self.limits.max_total_contracts {
            return TradeDecision::Denied(DenialReason::TotalContractsExceeded {
                limit: self.limits.max_total_contracts,
            });
        }

        if quantity > self.limits.max_contracts_per_trade {
            return TradeDecision::Denied(DenialReason::ContractsPerTradeExceeded {
                limit: self.limits.max_contracts_per_trade,
            });
        }

        if !self.active_positions.contains_key(instrument)
            && self.active_positions.len() >= self.limits.max_instruments
        {
            return TradeDecision::Denied(DenialReason::MaxInstruments {
                limit: self.limits.max_instruments,
            });
        }

        TradeDecision::Allowed
    }

    /// Check the dollar risk of a trade against `max_risk_per_trade`
    pub fn validate_trade_risk(
        &self,
        entry_price: Decimal,
        stop_loss: Decimal,
        quantity: u32,
        tick_size: Decimal,
        tick_value: Decimal,
    ) -> TradeDecision {
        if tick_size <= Decimal::ZERO || tick_value <= Decimal::ZERO {
            return TradeDecision::Denied(DenialReason::InvalidInstrument {
                tick_size,
                tick_value,
            });
        }

        let total_risk = risk_per_contract(entry_price, stop_loss, tick_size, tick_value)
            .and_then(|risk| risk.checked_mul(Decimal::from(quantity)))
            .unwrap_or(Decimal::MAX);

        if total_risk > self.limits.max_risk_per_trade {
            return TradeDecision::Denied(DenialReason::RiskPerTradeExceeded {
                risk: total_risk,
                limit: self.limits.max_risk_per_trade,
            });
        }
        TradeDecision::Allowed
    }

    /// Record an opened trade. Does not validate; call `can_trade` first.
    pub fn register_trade(&mut self, instrument: &str, quantity: u32, side: Side) {
        *self
            .active_positions
            .entry(instrument.to_string())
            .or_insert(0) += quantity;
        self.total_contracts = self.total_contracts.saturating_add(quantity);
        self.daily_trades += 1;
        self.total_trades += 1;

        tracing::debug!(
            instrument,
            quantity,
            %side,
            total_contracts = self.total_contracts,
            "Trade registered"
        );
    }

    /// Record a closed position and its realized P&L
    pub fn close_position(&mut self, instrument: &str, quantity: u32, pnl: Decimal) {
        self.close_position_at(instrument, quantity, pnl, Local::now());
    }

    /// Record a closed position with an explicit close time
    pub fn close_position_at(
        &mut self,
        instrument: &str,
        quantity: u32,
        pnl: Decimal,
        now: DateTime<Local>,
    ) {
        if let Some(open) = self.active_positions.get_mut(instrument) {
            *open = open.saturating_sub(quantity);
            if *open == 0 {
                self.active_positions.remove(instrument);
            }
        }
        self.total_contracts = self.total_contracts.saturating_sub(quantity);

        self.daily_pnl += pnl;
        self.total_pnl += pnl;

        if pnl < Decimal::ZERO {
            self.consecutive_losses += 1;
            self.last_loss_time = Some(now);

            if self.consecutive_losses >= self.limits.max_consecutive_losses {
                self.raise_alert("Consecutive loss limit reached", RiskLevel::Critical);
            }
        } else {
            self.consecutive_losses = 0;
        }
    }

    /// Overwrite daily P&L (e.g., from a broker account update)
    pub fn update_daily_pnl(&mut self, pnl: Decimal) {
        self.daily_pnl = pnl;
    }

    /// Start a new trading day. Does not re-enable trading.
    pub fn reset_daily_metrics(&mut self) {
        self.daily_pnl = Decimal::ZERO;
        self.daily_trades = 0;
        self.consecutive_losses = 0;
        self.last_loss_time = None;
    }

    /// Risk level from the share of the daily loss limit used
    pub fn get_risk_level(&self) -> RiskLevel {
        let used = self.daily_loss_used_pct();
        if used >= dec!(90) {
            RiskLevel::Critical
        } else if used >= dec!(70) {
            RiskLevel::High
        } else if used >= dec!(50) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Snapshot of the current risk state
    pub fn get_risk_metrics(&self) -> RiskMetrics {
        RiskMetrics {
            trading_enabled: self.trading_enabled,
            risk_level: self.get_risk_level(),
            daily_pnl: self.daily_pnl,
            total_pnl: self.total_pnl,
            daily_trades: self.daily_trades,
            total_trades: self.total_trades,
            consecutive_losses: self.consecutive_losses,
            active_instruments: self.active_positions.len(),
            total_contracts: self.total_contracts,
            daily_loss_used_pct: self.daily_loss_used_pct(),
        }
    }

    /// Re-enable trading after a shutdown
    pub fn enable_trading(&mut self) {
        self.trading_enabled = true;
        self.shutdown_reason = None;
        tracing::info!("Trading re-enabled");
    }

    /// Shut trading down manually
    pub fn disable_trading(&mut self, reason: impl Into<String>) {
        self.trigger_shutdown(ShutdownReason::Manual(reason.into()));
    }

    /// Drain pending notifications
    pub fn take_events(&mut self) -> Vec<RiskEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_trading_enabled(&self) -> bool {
        self.trading_enabled
    }

    pub fn shutdown_reason(&self) -> Option<&ShutdownReason> {
        self.shutdown_reason.as_ref()
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    pub fn daily_pnl(&self) -> Decimal {
        self.daily_pnl
    }

    pub fn total_pnl(&self) -> Decimal {
        self.total_pnl
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn total_contracts(&self) -> u32 {
        self.total_contracts
    }

    /// Open quantity on `instrument`, 0 when flat
    pub fn open_quantity(&self, instrument: &str) -> u32 {
        self.active_positions.get(instrument).copied().unwrap_or(0)
    }

    fn daily_loss_used_pct(&self) -> Decimal {
        if self.daily_pnl >= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.daily_pnl.abs() / self.limits.max_daily_loss * dec!(100)
    }

    fn trigger_shutdown(&mut self, reason: ShutdownReason) {
        tracing::error!(
            %reason,
            daily_pnl = %self.daily_pnl,
            total_pnl = %self.total_pnl,
            "Trading shut down"
        );
        self.trading_enabled = false;
        self.shutdown_reason = Some(reason.clone());
        self.events.push(RiskEvent::LimitReached { reason });
    }

    fn raise_alert(&mut self, message: &str, level: RiskLevel) {
        tracing::warn!(
            %level,
            consecutive_losses = self.consecutive_losses,
            "{message}"
        );
        self.events.push(RiskEvent::RiskViolation {
            message: message.to_string(),
            level,
        });
    }
}

impl fmt::Display for RiskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = self.get_risk_metrics();
        writeln!(f, "Risk Manager Status:")?;
        writeln!(f, "  Trading Enabled: {}", metrics.trading_enabled)?;
        writeln!(f, "  Risk Level: {}", metrics.risk_level)?;
        writeln!(f, "  Daily P&L: ${:+.2}", metrics.daily_pnl)?;
        writeln!(f, "  Total P&L: ${:+.2}", metrics.total_pnl)?;
        writeln!(f, "  Daily Trades: {}", metrics.daily_trades)?;
        writeln!(f, "  Consecutive Losses: {}", metrics.consecutive_losses)?;
        writeln!(
            f,
            "  Active Instruments: {}/{}",
            metrics.active_instruments, self.limits.max_instruments
        )?;
        writeln!(
            f,
            "  Total Contracts: {}/{}",
            metrics.total_contracts, self.limits.max_total_contracts
        )?;
        write!(f, "  Daily Loss Used: {:.1}%", metrics.daily_loss_used_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    fn manager(limits: RiskLimits) -> RiskManager {
        RiskManager::new(Arc::new(limits), dec!(50000)).unwrap()
    }

    fn denial(decision: TradeDecision) -> DenialReason {
        match decision {
            TradeDecision::Denied(reason) => reason,
            TradeDecision::Allowed => panic!("expected denial"),
        }
    }

    #[test]
    fn test_allows_fresh_trade() {
        let mut risk = manager(RiskLimits::default());
        let decision = risk.can_trade_at("ES", 1, at(10, 0, 0));
        assert!(decision.is_allowed());
        assert_eq!(decision.reason(), "Trade allowed");
    }

    #[test]
    fn test_rejects_invalid_limits() {
        let limits = RiskLimits {
            risk_per_trade_pct: dec!(150),
            ..Default::default()
        };
        assert!(RiskManager::new(Arc::new(limits), dec!(1000)).is_err());
    }

    #[test]
    fn test_daily_loss_trips_shutdown() {
        let mut risk = manager(RiskLimits::default());
        risk.close_position_at("ES", 1, dec!(-501), at(10, 0, 0));

        let first = risk.can_trade_at("ES", 1, at(10, 0, 1));
        assert_eq!(denial(first), DenialReason::DailyLossLimit);
        assert!(!risk.is_trading_enabled());
        assert_eq!(risk.shutdown_reason(), Some(&ShutdownReason::DailyLossLimit));

        let events = risk.take_events();
        assert!(events.contains(&RiskEvent::LimitReached {
            reason: ShutdownReason::DailyLossLimit
        }));

        let second = risk.can_trade_at("ES", 1, at(10, 0, 2));
        assert_eq!(second.reason(), "Trading disabled: Daily loss limit reached");

        risk.enable_trading();
        assert!(risk.is_trading_enabled());
        assert!(risk.shutdown_reason().is_none());
    }

    #[test]
    fn test_total_loss_trips_shutdown() {
        let limits = RiskLimits {
            max_daily_loss: dec!(5000),
            max_total_loss: dec!(1000),
            max_consecutive_losses: 100,
            ..Default::default()
        };
        let mut risk = manager(limits);
        risk.close_position_at("ES", 1, dec!(-600), at(10, 0, 0));
        risk.reset_daily_metrics();
        risk.close_position_at("ES", 1, dec!(-400), at(10, 5, 0));

        let decision = risk.can_trade_at("ES", 1, at(10, 6, 0));
        assert_eq!(denial(decision), DenialReason::TotalLossLimit);
        assert_eq!(risk.shutdown_reason(), Some(&ShutdownReason::TotalLossLimit));
    }

    #[test]
    fn test_disabled_denies_before_everything() {
        let limits = RiskLimits::default().with_trading_window(
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        );
        let mut risk = manager(limits);
        risk.disable_trading("maintenance");

        // Outside hours and oversized, but the shutdown reason wins
        let decision = risk.can_trade_at("ES", 50, at(20, 0, 0));
        assert_eq!(
            denial(decision),
            DenialReason::TradingDisabled(ShutdownReason::Manual("maintenance".to_string()))
        );
    }

    #[test]
    fn test_outside_trading_hours() {
        let limits = RiskLimits::default().with_trading_window(
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        );
        let mut risk = manager(limits);
        assert_eq!(
            denial(risk.can_trade_at("ES", 1, at(8, 0, 0))),
            DenialReason::OutsideTradingHours
        );
        assert!(risk.can_trade_at("ES", 1, at(9, 45, 0)).is_allowed());
        assert!(risk.is_trading_enabled());
    }

    #[test]
    fn test_profit_target_denies_without_shutdown() {
        let limits = RiskLimits {
            daily_profit_target: Some(dec!(1000)),
            ..Default::default()
        };
        let mut risk = manager(limits);
        risk.close_position_at("ES", 1, dec!(1000), at(10, 0, 0));

        assert_eq!(
            denial(risk.can_trade_at("ES", 1, at(10, 1, 0))),
            DenialReason::DailyProfitTarget
        );
        assert!(risk.is_trading_enabled());
    }

    #[test]
    fn test_max_daily_profit_cap() {
        let limits = RiskLimits {
            max_daily_profit: Some(dec!(750)),
            ..Default::default()
        };
        let mut risk = manager(limits);
        risk.update_daily_pnl(dec!(800));
        assert_eq!(
            denial(risk.can_trade_at("ES", 1, at(10, 0, 0))),
            DenialReason::MaxDailyProfit
        );
    }

    #[test]
    fn test_cool_down_after_consecutive_losses() {
        let mut risk = manager(RiskLimits::default());
        let start = at(10, 0, 0);
        for i in 0..3 {
            risk.close_position_at("ES", 1, dec!(-10), start + Duration::seconds(i));
        }

        let events = risk.take_events();
        assert_eq!(
            events,
            vec![RiskEvent::RiskViolation {
                message: "Consecutive loss limit reached".to_string(),
                level: RiskLevel::Critical,
            }]
        );

        // Last loss at 10:00:02, cool-down 300s
        let decision = risk.can_trade_at("ES", 1, at(10, 1, 2));
        assert_eq!(
            denial(decision),
            DenialReason::CoolDown {
                remaining_secs: 240
            }
        );

        assert!(risk.can_trade_at("ES", 1, at(10, 5, 2)).is_allowed());
    }

    #[test]
    fn test_win_resets_consecutive_losses() {
        let mut risk = manager(RiskLimits::default());
        risk.close_position_at("ES", 1, dec!(-10), at(10, 0, 0));
        risk.close_position_at("ES", 1, dec!(-10), at(10, 0, 1));
        assert_eq!(risk.consecutive_losses(), 2);

        risk.close_position_at("ES", 1, dec!(0), at(10, 0, 2));
        assert_eq!(risk.consecutive_losses(), 0);
        assert!(risk.take_events().is_empty());
    }

    #[test]
    fn test_contract_limits() {
        let limits = RiskLimits {
            max_contracts_per_trade: 3,
            max_total_contracts: 4,
            ..Default::default()
        };
        let mut risk = manager(limits);
        risk.register_trade("ES", 3, Side::Long);

        assert_eq!(
            denial(risk.can_trade_at("ES", 2, at(10, 0, 0))),
            DenialReason::TotalContractsExceeded { limit: 4 }
        );
        assert!(risk.can_trade_at("ES", 1, at(10, 0, 0)).is_allowed());

        let mut fresh = manager(RiskLimits {
            max_contracts_per_trade: 3,
            max_total_contracts: 10,
            ..Default::default()
        });
        assert_eq!(
            denial(fresh.can_trade_at("ES", 4, at(10, 0, 0))),
            DenialReason::ContractsPerTradeExceeded { limit: 3 }
        );
    }

    #[test]
    fn test_max_instruments() {
        let limits = RiskLimits {
            max_instruments: 2,
            ..Default::default()
        };
        let mut risk = manager(limits);
        risk.register_trade("ES", 1, Side::Long);
        risk.register_trade("NQ", 1, Side::Short);

        assert_eq!(
            denial(risk.can_trade_at("CL", 1, at(10, 0, 0))),
            DenialReason::MaxInstruments { limit: 2 }
        );
        // Adding to a held instrument is fine
        assert!(risk.can_trade_at("ES", 1, at(10, 0, 0)).is_allowed());
    }

    #[test]
    fn test_register_and_close_bookkeeping() {
        let mut risk = manager(RiskLimits::default());
        risk.register_trade("ES", 2, Side::Long);
        risk.register_trade("ES", 1, Side::Long);
        assert_eq!(risk.open_quantity("ES"), 3);
        assert_eq!(risk.total_contracts(), 3);

        risk.close_position_at("ES", 2, dec!(50), at(10, 0, 0));
        assert_eq!(risk.open_quantity("ES"), 1);

        risk.close_position_at("ES", 5, dec!(25), at(10, 1, 0));
        assert_eq!(risk.open_quantity("ES"), 0);
        assert_eq!(risk.total_contracts(), 0);

        let metrics = risk.get_risk_metrics();
        assert_eq!(metrics.daily_pnl, dec!(75));
        assert_eq!(metrics.total_pnl, dec!(75));
        assert_eq!(metrics.daily_trades, 2);
        assert_eq!(metrics.active_instruments, 0);
    }

    #[test]
    fn test_validate_trade_risk() {
        let limits = RiskLimits {
            max_risk_per_trade: dec!(200),
            ..Default::default()
        };
        let risk = manager(limits);

        // 2 points * $50 * 2 contracts = $200, at the limit
        assert!(risk
            .validate_trade_risk(dec!(4500), dec!(4498), 2, dec!(0.25), dec!(12.50))
            .is_allowed());

        let decision = risk.validate_trade_risk(dec!(4500), dec!(4498), 3, dec!(0.25), dec!(12.50));
        assert_eq!(
            denial(decision),
            DenialReason::RiskPerTradeExceeded {
                risk: dec!(300),
                limit: dec!(200)
            }
        );
    }

    #[test]
    fn test_validate_trade_risk_rejects_bad_ticks() {
        let risk = manager(RiskLimits::default());

        let decision = risk.validate_trade_risk(dec!(4500), dec!(4498), 1, dec!(0), dec!(12.50));
        assert_eq!(
            denial(decision),
            DenialReason::InvalidInstrument {
                tick_size: dec!(0),
                tick_value: dec!(12.50)
            }
        );

        let decision = risk.validate_trade_risk(dec!(4500), dec!(4498), 1, dec!(0.25), dec!(-1));
        assert_eq!(denial(decision).kind(), "invalid_instrument");
    }

    #[test]
    fn test_huge_cool_down_still_blocks() {
        let mut risk = manager(RiskLimits {
            cool_down_secs: u64::MAX,
            ..Default::default()
        });
        for s in 0..3 {
            risk.close_position_at("ES", 1, dec!(-10), at(10, 0, s));
        }

        let decision = risk.can_trade_at("ES", 1, at(23, 0, 0));
        assert!(matches!(denial(decision), DenialReason::CoolDown { .. }));
    }

    #[test]
    fn test_risk_levels() {
        let mut risk = manager(RiskLimits::default());
        assert_eq!(risk.get_risk_level(), RiskLevel::Low);

        risk.update_daily_pnl(dec!(-250));
        assert_eq!(risk.get_risk_level(), RiskLevel::Medium);
        risk.update_daily_pnl(dec!(-350));
        assert_eq!(risk.get_risk_level(), RiskLevel::High);
        risk.update_daily_pnl(dec!(-450));
        assert_eq!(risk.get_risk_level(), RiskLevel::Critical);

        // Profit never raises the level
        risk.update_daily_pnl(dec!(480));
        assert_eq!(risk.get_risk_level(), RiskLevel::Low);
        assert_eq!(risk.get_risk_metrics().daily_loss_used_pct, dec!(0));
    }

    #[test]
    fn test_reset_daily_keeps_shutdown() {
        let mut risk = manager(RiskLimits::default());
        risk.close_position_at("ES", 1, dec!(-600), at(10, 0, 0));
        let _ = risk.can_trade_at("ES", 1, at(10, 0, 1));
        risk.reset_daily_metrics();

        let metrics = risk.get_risk_metrics();
        assert_eq!(metrics.daily_pnl, dec!(0));
        assert_eq!(metrics.total_pnl, dec!(-600));
        assert!(!metrics.trading_enabled);
    }

    #[test]
    fn test_status_display() {
        let mut risk = manager(RiskLimits::default());
        risk.update_daily_pnl(dec!(-100));
        let status = risk.to_string();
        assert!(status.contains("Risk Manager Status:"));
        assert!(status.contains("Daily P&L: $-100.00"));
        assert!(status.contains("Daily Loss Used: 20.0%"));
    }
}
