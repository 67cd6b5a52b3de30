//! Simulation engine

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::SimulationReport;
use crate::config::Config;
use crate::execution::PaperBroker;
use crate::feed::ScriptedFeed;
use crate::strategy::{Strategy, StrategyEvent};

/// Runs a strategy session over a fixed price path
pub struct Simulator {
    config: Config,
    start: DateTime<Utc>,
    interval: Duration,
}

impl Simulator {
    /// Create a new simulator; ticks are one second apart starting now
    pub fn new(config: Config) -> Self {
        Self {
            config,
            start: Utc::now(),
            interval: Duration::seconds(1),
        }
    }

    /// Fix the timestamp of the first tick
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the session and summarize it
    pub async fn run(&self, prices: &[Decimal]) -> anyhow::Result<SimulationReport> {
        let instrument = self.config.instrument.clone();
        let initial_balance = self.config.account.initial_balance;
        let broker = Arc::new(PaperBroker::new(instrument.clone(), initial_balance));
        let mut strategy = Strategy::from_config(&self.config, Arc::clone(&broker))?;

        let feed = ScriptedFeed::from_prices(&instrument.symbol, prices, self.start, self.interval);
        tracing::info!(ticks = feed.len(), instrument = %instrument.symbol, "Simulation started");

        strategy.run(&feed, std::future::pending()).await?;

        let mut denial_reasons = BTreeMap::new();
        for event in strategy.take_events() {
            if let StrategyEvent::TradeDenied { reason } = event {
                *denial_reasons.entry(reason.kind().to_string()).or_insert(0) += 1;
            }
        }

        let stats = strategy.stats().clone();
        Ok(SimulationReport {
            instrument: instrument.symbol,
            ticks: stats.ticks,
            entries: stats.entries,
            trades: stats.trades_closed,
            wins: stats.wins,
            losses: stats.losses,
            win_rate: stats.win_rate(),
            realized_pnl: stats.realized_pnl,
            initial_balance,
            final_balance: broker.balance().await,
            stop_adjustments: stats.stop_adjustments,
            step_activations: stats.step_activations,
            denials: stats.denials,
            denial_reasons,
            risk: strategy.risk().get_risk_metrics(),
        })
    }
}

/// Deterministic demo path: a quiet warm-up, then alternating trends with a
/// one-tick wiggle
pub fn sample_path(base: Decimal, tick_size: Decimal) -> Vec<Decimal> {
    // (steps, ticks moved per step)
    const SEGMENTS: [(u32, i64); 7] = [(60, 0), (40, 2), (15, -3), (30, 2), (25, -4), (40, -1), (30, 3)];

    let mut prices = Vec::new();
    let mut price = base;
    for (steps, drift) in SEGMENTS {
        for i in 0..steps {
            let wiggle = if i % 2 == 0 { 1 } else { -1 };
            price += tick_size * Decimal::from(drift);
            prices.push(price + tick_size * Decimal::from(wiggle));
        }
    }
    prices
}
