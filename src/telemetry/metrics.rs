//! Prometheus metrics
//!
//! Recorded through the `metrics` facade; values are dropped unless an
//! exporter is installed with [`init_metrics_exporter`].

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Realized P&L since the start of the day
    DailyPnl,
    /// Realized P&L since start-up
    TotalPnl,
    /// Open contracts across instruments
    OpenContracts,
    /// Instruments with an open position
    ActiveInstruments,
    /// Balance used for sizing
    AccountBalance,
    /// Stop price of the tracked position
    CurrentStop,
    /// Active breakeven step of the tracked position
    BreakevenStep,
    /// 1 while trading is enabled
    TradingEnabled,
}

impl GaugeMetric {
    pub const fn name(self) -> &'static str {
        match self {
            GaugeMetric::DailyPnl => "tradeguard_daily_pnl_usd",
            GaugeMetric::TotalPnl => "tradeguard_total_pnl_usd",
            GaugeMetric::OpenContracts => "tradeguard_open_contracts",
            GaugeMetric::ActiveInstruments => "tradeguard_active_instruments",
            GaugeMetric::AccountBalance => "tradeguard_account_balance_usd",
            GaugeMetric::CurrentStop => "tradeguard_current_stop",
            GaugeMetric::BreakevenStep => "tradeguard_breakeven_step",
            GaugeMetric::TradingEnabled => "tradeguard_trading_enabled",
        }
    }
}

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    OrdersSubmitted,
    StopAdjustments,
    StepActivations,
    TradesClosed,
    Shutdowns,
}

impl CounterMetric {
    pub const fn name(self) -> &'static str {
        match self {
            CounterMetric::OrdersSubmitted => "tradeguard_orders_submitted_total",
            CounterMetric::StopAdjustments => "tradeguard_stop_adjustments_total",
            CounterMetric::StepActivations => "tradeguard_breakeven_steps_total",
            CounterMetric::TradesClosed => "tradeguard_trades_closed_total",
            CounterMetric::Shutdowns => "tradeguard_shutdowns_total",
        }
    }
}

const TRADES_DENIED: &str = "tradeguard_trades_denied_total";

/// Install the Prometheus exporter with an HTTP listener on `port`
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    describe_metrics();
    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}

fn describe_metrics() {
    describe_gauge!(GaugeMetric::DailyPnl.name(), "Realized P&L for the current day");
    describe_gauge!(GaugeMetric::TotalPnl.name(), "Realized P&L since start-up");
    describe_gauge!(GaugeMetric::OpenContracts.name(), "Open contracts");
    describe_gauge!(GaugeMetric::CurrentStop.name(), "Stop of the tracked position");
    describe_counter!(TRADES_DENIED, "Entries rejected by the risk gate, by reason");
    describe_counter!(CounterMetric::StopAdjustments.name(), "Stop moves emitted");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    gauge!(metric.name()).set(value);
}

/// Set a gauge from a decimal value
pub fn set_decimal_gauge(metric: GaugeMetric, value: Decimal) {
    set_gauge(metric, value.to_f64().unwrap_or(0.0));
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    counter!(metric.name()).increment(1);
}

/// Count a risk-gate denial under its reason label
pub fn record_denial(reason: &'static str) {
    counter!(TRADES_DENIED, "reason" => reason).increment(1);
}
