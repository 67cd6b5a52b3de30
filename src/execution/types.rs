//! Execution types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Side;

/// Order identifier
pub type OrderId = Uuid;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    /// Action that opens a position on `side`
    pub fn entry(side: Side) -> Self {
        match side {
            Side::Long => OrderAction::Buy,
            Side::Short => OrderAction::Sell,
        }
    }

    /// Action that closes a position on `side`
    pub fn exit(side: Side) -> Self {
        Self::entry(side.opposite())
    }

    /// Position side this action adds to
    pub fn side(self) -> Side {
        match self {
            OrderAction::Buy => Side::Long,
            OrderAction::Sell => Side::Short,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Market order (immediate execution)
    Market,
    /// Stop market order, triggered at `stop_price`
    StopMarket,
    /// Limit order resting at `limit_price`
    Limit,
}

/// An order to be submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument symbol
    pub instrument: String,
    /// Buy or sell
    pub action: OrderAction,
    /// Contracts
    pub quantity: u32,
    /// Order type
    pub order_type: OrderType,
    /// Trigger price for stop orders
    pub stop_price: Option<Decimal>,
    /// Price for limit orders
    pub limit_price: Option<Decimal>,
    /// Last traded price when the order was created
    pub reference_price: Decimal,
    /// Free-form tag for the order source
    pub signal_name: Option<String>,
}

impl OrderRequest {
    /// Market order at the current price
    pub fn market(
        instrument: impl Into<String>,
        action: OrderAction,
        quantity: u32,
        reference_price: Decimal,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            action,
            quantity,
            order_type: OrderType::Market,
            stop_price: None,
            limit_price: None,
            reference_price,
            signal_name: None,
        }
    }

    /// Protective stop market order
    pub fn stop(
        instrument: impl Into<String>,
        action: OrderAction,
        quantity: u32,
        stop_price: Decimal,
        reference_price: Decimal,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            action,
            quantity,
            order_type: OrderType::StopMarket,
            stop_price: Some(stop_price),
            limit_price: None,
            reference_price,
            signal_name: None,
        }
    }

    /// Profit-taking limit order
    pub fn limit(
        instrument: impl Into<String>,
        action: OrderAction,
        quantity: u32,
        limit_price: Decimal,
        reference_price: Decimal,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            action,
            quantity,
            order_type: OrderType::Limit,
            stop_price: None,
            limit_price: Some(limit_price),
            reference_price,
            signal_name: None,
        }
    }

    pub fn with_signal_name(mut self, name: impl Into<String>) -> Self {
        self.signal_name = Some(name.into());
        self
    }
}

/// A fill (executed order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Order ID
    pub order_id: OrderId,
    /// Instrument symbol
    pub instrument: String,
    /// Buy or sell
    pub action: OrderAction,
    /// Contracts filled
    pub quantity: u32,
    /// Fill price
    pub price: Decimal,
    /// Fill timestamp
    pub timestamp: DateTime<Utc>,
}

/// Asynchronous notification from the broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrokerEvent {
    /// An order was filled
    Filled(Fill),
    /// A position went flat (fully or partly) and realized P&L
    PositionClosed {
        instrument: String,
        side: Side,
        quantity: u32,
        entry_price: Decimal,
        exit_price: Decimal,
        realized_pnl: Decimal,
        timestamp: DateTime<Utc>,
    },
    /// Account balance after realized P&L
    AccountBalance(Decimal),
}
