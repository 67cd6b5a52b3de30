//! Paper trading broker with simulated fills
//!
//! Market orders fill at their reference price. Stop orders rest until a
//! marked price crosses them and then fill at that price; limit orders fill at
//! their limit once the market trades through it. One net position is kept per
//! instrument, and going flat voids that instrument's resting orders.

use super::{BrokerEvent, Fill, OrderAction, OrderGateway, OrderId, OrderRequest, OrderType};
use crate::feed::Tick;
use crate::risk::points_to_dollars;
use crate::types::{InstrumentSpec, Side};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Net open position held by the paper broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperPosition {
    pub side: Side,
    pub quantity: u32,
    pub entry_price: Decimal,
}

#[derive(Debug, Clone)]
struct WorkingOrder {
    request: OrderRequest,
    price: Decimal,
}

impl WorkingOrder {
    fn is_stop(&self) -> bool {
        self.request.order_type == OrderType::StopMarket
    }

    /// Fill price if `market` reaches this order
    fn triggered_at(&self, market: Decimal) -> Option<Decimal> {
        let crossed = match (self.request.order_type, self.request.action) {
            (OrderType::StopMarket, OrderAction::Sell) => market <= self.price,
            (OrderType::StopMarket, OrderAction::Buy) => market >= self.price,
            (OrderType::Limit, OrderAction::Sell) => market >= self.price,
            (OrderType::Limit, OrderAction::Buy) => market <= self.price,
            (OrderType::Market, _) => true,
        };
        match (crossed, self.request.order_type) {
            (false, _) => None,
            (true, OrderType::Limit) => Some(self.price),
            (true, _) => Some(market),
        }
    }
}

#[derive(Debug, Default)]
struct BrokerState {
    positions: HashMap<String, PaperPosition>,
    working: HashMap<OrderId, WorkingOrder>,
    fills: Vec<Fill>,
    events: Vec<BrokerEvent>,
    balance: Decimal,
    clock: Option<DateTime<Utc>>,
}

/// Paper broker implementing `OrderGateway`
pub struct PaperBroker {
    instrument: InstrumentSpec,
    state: Arc<RwLock<BrokerState>>,
}

impl PaperBroker {
    /// Create a new paper broker with a starting balance
    pub fn new(instrument: InstrumentSpec, initial_balance: Decimal) -> Self {
        Self {
            instrument,
            state: Arc::new(RwLock::new(BrokerState {
                balance: initial_balance,
                ..Default::default()
            })),
        }
    }

    pub fn instrument(&self) -> &InstrumentSpec {
        &self.instrument
    }

    /// Apply a new market price, filling any resting order it reaches
    pub async fn mark(&self, tick: &Tick) {
        let mut state = self.state.write().await;
        state.clock = Some(tick.timestamp);

        let triggered: Vec<(OrderId, Decimal)> = state
            .working
            .iter()
            .filter(|(_, order)| order.request.instrument == tick.instrument)
            .filter_map(|(id, order)| order.triggered_at(tick.price).map(|fill| (*id, fill)))
            .collect();

        for (id, fill_price) in triggered {
            // An earlier fill in this batch may have flattened the position
            if let Some(order) = state.working.remove(&id) {
                tracing::info!(
                    order_id = %id,
                    order_type = ?order.request.order_type,
                    trigger = %order.price,
                    price = %fill_price,
                    "Paper order triggered"
                );
                self.execute(&mut state, id, &order.request, fill_price);
            }
        }
    }

    /// Current position on `instrument`, if any
    pub async fn position(&self, instrument: &str) -> Option<PaperPosition> {
        self.state.read().await.positions.get(instrument).cloned()
    }

    pub async fn balance(&self) -> Decimal {
        self.state.read().await.balance
    }

    pub async fn fills(&self) -> Vec<Fill> {
        self.state.read().await.fills.clone()
    }

    /// Trigger price of a working stop
    pub async fn stop_price(&self, id: OrderId) -> Option<Decimal> {
        self.state
            .read()
            .await
            .working
            .get(&id)
            .filter(|order| order.is_stop())
            .map(|order| order.price)
    }

    /// Price of a resting limit order
    pub async fn limit_price(&self, id: OrderId) -> Option<Decimal> {
        self.state
            .read()
            .await
            .working
            .get(&id)
            .filter(|order| order.request.order_type == OrderType::Limit)
            .map(|order| order.price)
    }

    pub async fn working_stops(&self) -> usize {
        self.state
            .read()
            .await
            .working
            .values()
            .filter(|order| order.is_stop())
            .count()
    }

    /// Resting orders of any type
    pub async fn working_orders(&self) -> usize {
        self.state.read().await.working.len()
    }

    /// Fill `request` at `price` and update the net position
    fn execute(&self, state: &mut BrokerState, order_id: OrderId, request: &OrderRequest, price: Decimal) {
        let timestamp = state.clock.unwrap_or_else(Utc::now);
        let fill = Fill {
            order_id,
            instrument: request.instrument.clone(),
            action: request.action,
            quantity: request.quantity,
            price,
            timestamp,
        };
        state.fills.push(fill.clone());
        state.events.push(BrokerEvent::Filled(fill));

        let side = request.action.side();
        let mut remaining = request.quantity;
        let existing = state.positions.remove(&request.instrument);

        match existing {
            Some(mut pos) if pos.side == side => {
                let total = pos.quantity + remaining;
                pos.entry_price = (pos.entry_price * Decimal::from(pos.quantity)
                    + price * Decimal::from(remaining))
                    / Decimal::from(total);
                pos.quantity = total;
                state.positions.insert(request.instrument.clone(), pos);
                remaining = 0;
            }
            Some(mut pos) => {
                let closed = remaining.min(pos.quantity);
                let points = pos.side.profit(pos.entry_price, price);
                let pnl = points_to_dollars(
                    points,
                    closed,
                    self.instrument.tick_size,
                    self.instrument.tick_value,
                );
                state.balance += pnl;

                tracing::info!(
                    instrument = %request.instrument,
                    side = %pos.side,
                    quantity = closed,
                    entry = %pos.entry_price,
                    exit = %price,
                    pnl = %pnl,
                    "Paper position closed"
                );
                state.events.push(BrokerEvent::PositionClosed {
                    instrument: request.instrument.clone(),
                    side: pos.side,
                    quantity: closed,
                    entry_price: pos.entry_price,
                    exit_price: price,
                    realized_pnl: pnl,
                    timestamp,
                });
                state.events.push(BrokerEvent::AccountBalance(state.balance));

                pos.quantity -= closed;
                remaining -= closed;
                if pos.quantity > 0 {
                    state.positions.insert(request.instrument.clone(), pos);
                } else {
                    // Flat: stops and targets on this instrument are void
                    state
                        .working
                        .retain(|_, order| order.request.instrument != request.instrument);
                }
            }
            None => {}
        }

        if remaining > 0 {
            state.positions.insert(
                request.instrument.clone(),
                PaperPosition {
                    side,
                    quantity: remaining,
                    entry_price: price,
                },
            );
        }
    }
}

#[async_trait]
impl OrderGateway for PaperBroker {
    async fn submit_order(&self, order: OrderRequest) -> anyhow::Result<OrderId> {
        if order.quantity == 0 {
            bail!("order quantity must be positive");
        }
        let order_id = OrderId::new_v4();
        let mut state = self.state.write().await;

        match order.order_type {
            OrderType::Market => {
                let price = order.reference_price;
                self.execute(&mut state, order_id, &order, price);
                tracing::info!(%order_id, action = ?order.action, quantity = order.quantity, %price, "Paper order filled");
            }
            OrderType::StopMarket => {
                let stop_price = order
                    .stop_price
                    .ok_or_else(|| anyhow!("stop order without stop price"))?;
                tracing::info!(%order_id, action = ?order.action, %stop_price, "Paper stop working");
                state.working.insert(
                    order_id,
                    WorkingOrder {
                        request: order,
                        price: stop_price,
                    },
                );
            }
            OrderType::Limit => {
                let limit_price = order
                    .limit_price
                    .ok_or_else(|| anyhow!("limit order without limit price"))?;
                tracing::info!(%order_id, action = ?order.action, %limit_price, "Paper limit working");
                state.working.insert(
                    order_id,
                    WorkingOrder {
                        request: order,
                        price: limit_price,
                    },
                );
            }
        }

        Ok(order_id)
    }

    async fn modify_stop(&self, id: OrderId, stop_price: Decimal) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        let stop = state
            .working
            .get_mut(&id)
            .filter(|order| order.is_stop())
            .ok_or_else(|| anyhow!("no working stop {id}"))?;
        tracing::debug!(order_id = %id, old = %stop.price, new = %stop_price, "Paper stop modified");
        stop.price = stop_price;
        Ok(())
    }

    async fn cancel_order(&self, id: OrderId) -> anyhow::Result<()> {
        let removed = self.state.write().await.working.remove(&id);
        tracing::info!(order_id = %id, found = removed.is_some(), "Paper order cancelled");
        Ok(())
    }

    async fn poll_events(&self) -> anyhow::Result<Vec<BrokerEvent>> {
        Ok(std::mem::take(&mut self.state.write().await.events))
    }

    async fn on_market_data(&self, tick: &Tick) -> anyhow::Result<()> {
        self.mark(tick).await;
        Ok(())
    }
}
