//! Market data feed module
//!
//! Delivers last-trade ticks to the strategy

mod scripted;
mod types;

pub use scripted::ScriptedFeed;
pub use types::Tick;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for market feed implementations
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Subscribe to tick updates; the channel closes when the feed ends
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<Tick>>;
}
