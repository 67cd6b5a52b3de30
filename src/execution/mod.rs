//! Order execution module
//!
//! Order gateway abstraction and a paper broker for simulation

mod paper;
mod types;

pub use paper::{PaperBroker, PaperPosition};
pub use types::{BrokerEvent, Fill, OrderAction, OrderId, OrderRequest, OrderType};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::feed::Tick;

/// Trait for order gateway implementations
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order
    async fn submit_order(&self, order: OrderRequest) -> anyhow::Result<OrderId>;
    /// Move the trigger price of a working stop order
    async fn modify_stop(&self, id: OrderId, stop_price: Decimal) -> anyhow::Result<()>;
    /// Cancel a working order
    async fn cancel_order(&self, id: OrderId) -> anyhow::Result<()>;
    /// Drain fills, position closes and balance updates since the last call
    async fn poll_events(&self) -> anyhow::Result<Vec<BrokerEvent>>;
    /// Market data seen by the strategy; simulated gateways use it to trigger stops
    async fn on_market_data(&self, _tick: &Tick) -> anyhow::Result<()> {
        Ok(())
    }
}
