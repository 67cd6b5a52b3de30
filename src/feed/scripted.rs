//! Replay of a fixed tick sequence

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use super::{MarketFeed, Tick};

const CHANNEL_CAPACITY: usize = 1024;

/// Feed that replays a prepared list of ticks and then closes
#[derive(Debug, Clone)]
pub struct ScriptedFeed {
    ticks: Vec<Tick>,
}

impl ScriptedFeed {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self { ticks }
    }

    /// Build ticks from a price path spaced `interval` apart from `start`
    pub fn from_prices(
        instrument: &str,
        prices: &[Decimal],
        start: DateTime<Utc>,
        interval: Duration,
    ) -> Self {
        let ticks = prices
            .iter()
            .zip(0i32..)
            .map(|(price, i)| Tick::new(instrument, *price, start + interval * i))
            .collect();
        Self { ticks }
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

#[async_trait]
impl MarketFeed for ScriptedFeed {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<Tick>> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let ticks = self.ticks.clone();

        tokio::spawn(async move {
            for tick in ticks {
                if tx.send(tick).await.is_err() {
                    tracing::debug!("Scripted feed receiver dropped");
                    break;
                }
            }
        });

        Ok(rx)
    }
}
