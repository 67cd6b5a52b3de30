//! Per-tick trading loop
//!
//! Each tick runs, in order: daily rollover, gateway market update and event
//! sync, breakeven stop management, then the entry path (signal, risk gate,
//! entry throttle, sizing, dollar-risk check, order).

use chrono::{DateTime, Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;

use super::{StrategyEvent, StrategyStats};
use crate::breakeven::{BreakevenConfig, BreakevenEvent, BreakevenManager};
use crate::config::{Config, StrategyConfig};
use crate::error::ConfigError;
use crate::execution::{BrokerEvent, Fill, OrderAction, OrderGateway, OrderId, OrderRequest};
use crate::feed::{MarketFeed, Tick};
use crate::risk::{
    DenialReason, PositionSizer, RiskEvent, RiskLimits, RiskManager, TradeDecision,
};
use crate::signal::{MomentumSignal, Signal};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::types::{InstrumentSpec, Side};

const SIGNAL_NAME: &str = "MOMENTUM";

#[derive(Debug, Clone)]
struct PendingEntry {
    order_id: OrderId,
    side: Side,
    stop: Decimal,
}

#[derive(Debug, Clone)]
struct OpenTrade {
    side: Side,
    quantity: u32,
    entry_price: Decimal,
    stop_order: Option<OrderId>,
    target_order: Option<OrderId>,
}

/// Single-instrument strategy driven by market ticks
pub struct Strategy<G: OrderGateway> {
    instrument: InstrumentSpec,
    config: StrategyConfig,
    risk: RiskManager,
    sizer: PositionSizer,
    breakeven: BreakevenManager,
    signal: MomentumSignal,
    gateway: Arc<G>,
    pending_entry: Option<PendingEntry>,
    position: Option<OpenTrade>,
    exit_pending: bool,
    trading_day: Option<NaiveDate>,
    last_price: Option<Decimal>,
    last_entry_at: Option<DateTime<Utc>>,
    stats: StrategyStats,
    events: Vec<StrategyEvent>,
}

impl<G: OrderGateway> Strategy<G> {
    /// Create a strategy for one instrument
    pub fn new(
        instrument: InstrumentSpec,
        config: StrategyConfig,
        limits: Arc<RiskLimits>,
        initial_balance: Decimal,
        breakeven: BreakevenConfig,
        gateway: Arc<G>,
    ) -> Result<Self, ConfigError> {
        instrument.validate()?;
        config.validate()?;
        let risk = RiskManager::new(Arc::clone(&limits), initial_balance)?;
        let sizer = PositionSizer::new(initial_balance, limits)?;

        Ok(Self {
            signal: MomentumSignal::new(config.momentum()),
            instrument,
            config,
            risk,
            sizer,
            breakeven: BreakevenManager::new(breakeven),
            gateway,
            pending_entry: None,
            position: None,
            exit_pending: false,
            trading_day: None,
            last_price: None,
            last_entry_at: None,
            stats: StrategyStats::default(),
            events: Vec::new(),
        })
    }

    /// Create from a loaded configuration file
    pub fn from_config(config: &Config, gateway: Arc<G>) -> Result<Self, ConfigError> {
        Self::new(
            config.instrument.clone(),
            config.strategy.clone(),
            config.risk_limits(),
            config.account.initial_balance,
            config.breakeven_config()?,
            gateway,
        )
    }

    /// Consume the feed until it closes or `shutdown` resolves, then flatten
    pub async fn run<F>(&mut self, feed: &F, shutdown: impl Future<Output = ()>) -> anyhow::Result<()>
    where
        F: MarketFeed + ?Sized,
    {
        let mut ticks = feed.subscribe().await?;
        tokio::pin!(shutdown);

        tracing::info!(instrument = %self.instrument.symbol, "Strategy started");

        loop {
            tokio::select! {
                maybe_tick = ticks.recv() => match maybe_tick {
                    Some(tick) => self.on_tick(&tick).await?,
                    None => {
                        tracing::info!("Market feed closed");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
            }
        }

        self.flatten("session end").await?;
        tracing::info!(
            trades = self.stats.trades_closed,
            realized_pnl = %self.stats.realized_pnl,
            "Strategy stopped"
        );
        Ok(())
    }

    /// Process one market tick
    pub async fn on_tick(&mut self, tick: &Tick) -> anyhow::Result<()> {
        if tick.instrument != self.instrument.symbol {
            tracing::debug!(instrument = %tick.instrument, "Ignoring tick for other instrument");
            return Ok(());
        }
        self.stats.ticks += 1;
        self.roll_trading_day(tick);

        self.gateway.on_market_data(tick).await?;
        self.last_price = Some(tick.price);
        self.sync_broker().await?;

        if self.position.is_some() && !self.exit_pending {
            self.manage_stop(tick).await?;
        }

        self.signal.update(tick.price);

        if !self.risk.is_trading_enabled() {
            if self.position.is_some() && !self.exit_pending {
                self.flatten("trading disabled").await?;
            }
        } else if self.position.is_none() && self.pending_entry.is_none() {
            if let Some(signal) = self.signal.detect(tick.timestamp) {
                self.try_enter(&signal, tick).await?;
            }
        }

        self.publish_metrics();
        Ok(())
    }

    /// Disable trading and close any open position
    pub async fn shutdown(&mut self, reason: &str) -> anyhow::Result<()> {
        self.risk.disable_trading(reason);
        self.drain_risk_events();
        self.flatten(reason).await
    }

    fn roll_trading_day(&mut self, tick: &Tick) {
        let date = tick.timestamp.with_timezone(&Local).date_naive();
        match self.trading_day {
            Some(current) if current != date => {
                self.risk.reset_daily_metrics();
                tracing::info!(%date, "New trading day, daily risk metrics reset");
                self.events.push(StrategyEvent::DailyReset { date });
            }
            _ => {}
        }
        self.trading_day = Some(date);
    }

    async fn manage_stop(&mut self, tick: &Tick) -> anyhow::Result<()> {
        let new_stop = self.breakeven.update_at(tick.price, tick.timestamp);
        self.drain_breakeven_events();

        let Some(stop) = new_stop else {
            return Ok(());
        };

        if let Some(order_id) = self.position.as_ref().and_then(|p| p.stop_order) {
            self.gateway.modify_stop(order_id, stop).await?;
        }
        telemetry::set_decimal_gauge(GaugeMetric::CurrentStop, stop);
        self.events.push(StrategyEvent::StopMoved {
            step: self.breakeven.current_step(),
            stop,
        });
        Ok(())
    }

    async fn try_enter(&mut self, signal: &Signal, tick: &Tick) -> anyhow::Result<()> {
        let side = signal.side;
        let entry = tick.price;
        let symbol = self.instrument.symbol.clone();

        let decision = self
            .risk
            .can_trade_at(&symbol, 1, tick.timestamp.with_timezone(&Local));
        self.drain_risk_events();
        if let TradeDecision::Denied(reason) = decision {
            self.deny(reason);
            return Ok(());
        }

        if let Some(remaining_secs) = self.throttle_remaining(tick.timestamp) {
            self.deny(DenialReason::TradeThrottled { remaining_secs });
            return Ok(());
        }

        let stop_distance = self.instrument.ticks_to_points(self.config.stop_loss_ticks);
        let stop = side.offset(entry, -stop_distance);

        let headroom = self.config.entry_quantity.min(
            self.risk
                .limits()
                .max_total_contracts
                .saturating_sub(self.risk.total_contracts()),
        );
        let quantity = self.sizer.calculate_position_size(
            entry,
            stop,
            self.instrument.tick_size,
            self.instrument.tick_value,
            Some(headroom),
        );
        if quantity == 0 {
            self.deny(DenialReason::ZeroPositionSize);
            return Ok(());
        }

        if let TradeDecision::Denied(reason) = self.risk.validate_trade_risk(
            entry,
            stop,
            quantity,
            self.instrument.tick_size,
            self.instrument.tick_value,
        ) {
            self.deny(reason);
            return Ok(());
        }

        let order = OrderRequest::market(&symbol, OrderAction::entry(side), quantity, entry)
            .with_signal_name(SIGNAL_NAME);
        let order_id = self.gateway.submit_order(order).await?;
        telemetry::increment(CounterMetric::OrdersSubmitted);

        self.risk.register_trade(&symbol, quantity, side);
        self.last_entry_at = Some(tick.timestamp);
        self.pending_entry = Some(PendingEntry {
            order_id,
            side,
            stop,
        });
        self.stats.entries += 1;

        tracing::info!(
            %side,
            quantity,
            entry = %entry,
            stop = %stop,
            momentum = %signal.momentum,
            "Entry submitted"
        );
        self.events.push(StrategyEvent::EntrySubmitted {
            side,
            quantity,
            price: entry,
            stop,
        });

        self.sync_broker().await
    }

    /// Seconds until another entry is allowed, if still inside the interval
    fn throttle_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let last = self.last_entry_at?;
        let interval_ms = i64::try_from(self.config.min_trade_interval_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let elapsed_ms = (now - last).num_milliseconds();
        (elapsed_ms < interval_ms).then(|| (interval_ms - elapsed_ms).saturating_add(999) / 1000)
    }

    fn deny(&mut self, reason: DenialReason) {
        tracing::warn!(reason = %reason, kind = reason.kind(), "Trade denied");
        telemetry::record_denial(reason.kind());
        self.stats.denials += 1;
        self.events.push(StrategyEvent::TradeDenied { reason });
    }

    /// Close the open position at market, cancelling its stop and target
    async fn flatten(&mut self, reason: &str) -> anyhow::Result<()> {
        let Some(trade) = self.position.clone() else {
            return Ok(());
        };
        if self.exit_pending {
            return Ok(());
        }

        for order_id in trade.stop_order.into_iter().chain(trade.target_order) {
            self.gateway.cancel_order(order_id).await?;
        }

        let price = self.last_price.unwrap_or(trade.entry_price);
        let order = OrderRequest::market(
            &self.instrument.symbol,
            OrderAction::exit(trade.side),
            trade.quantity,
            price,
        );
        self.gateway.submit_order(order).await?;
        telemetry::increment(CounterMetric::OrdersSubmitted);
        self.exit_pending = true;

        tracing::warn!(reason, side = %trade.side, quantity = trade.quantity, %price, "Flattening position");
        self.events.push(StrategyEvent::Flattened {
            reason: reason.to_string(),
        });

        self.sync_broker().await
    }

    /// Apply every broker event queued by the gateway
    async fn sync_broker(&mut self) -> anyhow::Result<()> {
        loop {
            let events = self.gateway.poll_events().await?;
            if events.is_empty() {
                return Ok(());
            }
            for event in events {
                self.on_broker_event(event).await?;
            }
        }
    }

    async fn on_broker_event(&mut self, event: BrokerEvent) -> anyhow::Result<()> {
        match event {
            BrokerEvent::Filled(fill) => self.on_fill(fill).await,
            BrokerEvent::PositionClosed {
                instrument,
                side,
                quantity,
                exit_price,
                realized_pnl,
                timestamp,
                ..
            } => {
                if instrument != self.instrument.symbol {
                    return Ok(());
                }
                self.risk.close_position_at(
                    &instrument,
                    quantity,
                    realized_pnl,
                    timestamp.with_timezone(&Local),
                );
                self.drain_risk_events();

                self.stats.trades_closed += 1;
                self.stats.realized_pnl += realized_pnl;
                if realized_pnl > Decimal::ZERO {
                    self.stats.wins += 1;
                } else if realized_pnl < Decimal::ZERO {
                    self.stats.losses += 1;
                }
                telemetry::increment(CounterMetric::TradesClosed);

                let remaining = self
                    .position
                    .as_ref()
                    .map_or(0, |p| p.quantity.saturating_sub(quantity));
                if remaining == 0 {
                    self.breakeven.reset();
                    self.position = None;
                    self.exit_pending = false;
                } else if let Some(trade) = self.position.as_mut() {
                    trade.quantity = remaining;
                }

                tracing::info!(
                    %side,
                    quantity,
                    exit = %exit_price,
                    pnl = %realized_pnl,
                    daily_pnl = %self.risk.daily_pnl(),
                    "Position closed"
                );
                self.events.push(StrategyEvent::PositionClosed {
                    side,
                    quantity,
                    exit_price,
                    pnl: realized_pnl,
                });
                Ok(())
            }
            BrokerEvent::AccountBalance(balance) => {
                self.sizer.update_account_balance(balance);
                telemetry::set_decimal_gauge(GaugeMetric::AccountBalance, balance);
                Ok(())
            }
        }
    }

    async fn on_fill(&mut self, fill: Fill) -> anyhow::Result<()> {
        let is_entry = self
            .pending_entry
            .as_ref()
            .is_some_and(|p| p.order_id == fill.order_id);
        if !is_entry {
            tracing::debug!(order_id = %fill.order_id, price = %fill.price, "Exit fill");
            return Ok(());
        }
        let Some(pending) = self.pending_entry.take() else {
            return Ok(());
        };

        self.breakeven
            .initialize_position(fill.price, pending.stop, pending.side);

        let stop_order = OrderRequest::stop(
            &fill.instrument,
            OrderAction::exit(pending.side),
            fill.quantity,
            pending.stop,
            fill.price,
        )
        .with_signal_name(SIGNAL_NAME);
        let stop_id = self.gateway.submit_order(stop_order).await?;
        telemetry::increment(CounterMetric::OrdersSubmitted);

        let target = self.take_profit_price(pending.side, fill.price, pending.stop);
        let target_order = match target {
            Some(price) => {
                let order = OrderRequest::limit(
                    &fill.instrument,
                    OrderAction::exit(pending.side),
                    fill.quantity,
                    price,
                    fill.price,
                )
                .with_signal_name(SIGNAL_NAME);
                let id = self.gateway.submit_order(order).await?;
                telemetry::increment(CounterMetric::OrdersSubmitted);
                Some(id)
            }
            None => None,
        };

        self.position = Some(OpenTrade {
            side: pending.side,
            quantity: fill.quantity,
            entry_price: fill.price,
            stop_order: Some(stop_id),
            target_order,
        });
        telemetry::set_decimal_gauge(GaugeMetric::CurrentStop, pending.stop);

        tracing::info!(
            side = %pending.side,
            quantity = fill.quantity,
            entry = %fill.price,
            stop = %pending.stop,
            target = ?target,
            "Position opened"
        );
        self.events.push(StrategyEvent::PositionOpened {
            side: pending.side,
            quantity: fill.quantity,
            entry_price: fill.price,
            stop: pending.stop,
            target,
        });
        Ok(())
    }

    /// Target at `take_profit_multiple` times the stop distance past the entry
    fn take_profit_price(&self, side: Side, entry: Decimal, stop: Decimal) -> Option<Decimal> {
        let multiple = self.config.take_profit_multiple;
        if multiple <= Decimal::ZERO {
            return None;
        }
        let distance = (entry - stop).abs().checked_mul(multiple)?;
        Some(side.offset(entry, distance))
    }

    fn drain_breakeven_events(&mut self) {
        for event in self.breakeven.take_events() {
            match event {
                BreakevenEvent::StepActivated { .. } => {
                    self.stats.step_activations += 1;
                    telemetry::increment(CounterMetric::StepActivations);
                }
                BreakevenEvent::StopAdjusted { .. } => {
                    self.stats.stop_adjustments += 1;
                    telemetry::increment(CounterMetric::StopAdjustments);
                }
            }
        }
    }

    fn drain_risk_events(&mut self) {
        for event in self.risk.take_events() {
            if let RiskEvent::LimitReached { .. } = &event {
                telemetry::increment(CounterMetric::Shutdowns);
            }
            self.events.push(StrategyEvent::Risk(event));
        }
    }

    fn publish_metrics(&self) {
        let metrics = self.risk.get_risk_metrics();
        telemetry::set_decimal_gauge(GaugeMetric::DailyPnl, metrics.daily_pnl);
        telemetry::set_decimal_gauge(GaugeMetric::TotalPnl, metrics.total_pnl);
        telemetry::set_gauge(GaugeMetric::OpenContracts, f64::from(metrics.total_contracts));
        telemetry::set_gauge(
            GaugeMetric::ActiveInstruments,
            metrics.active_instruments as f64,
        );
        telemetry::set_gauge(
            GaugeMetric::TradingEnabled,
            if metrics.trading_enabled { 1.0 } else { 0.0 },
        );
        telemetry::set_gauge(
            GaugeMetric::BreakevenStep,
            self.breakeven.current_step() as f64,
        );
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<StrategyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> &StrategyStats {
        &self.stats
    }

    pub fn risk(&self) -> &RiskManager {
        &self.risk
    }

    pub fn risk_mut(&mut self) -> &mut RiskManager {
        &mut self.risk
    }

    pub fn sizer(&self) -> &PositionSizer {
        &self.sizer
    }

    pub fn breakeven(&self) -> &BreakevenManager {
        &self.breakeven
    }

    pub fn instrument(&self) -> &InstrumentSpec {
        &self.instrument
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }
}
