//! Strategy types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::risk::{DenialReason, RiskEvent};
use crate::types::Side;

/// Notable strategy lifecycle events, drained with `Strategy::take_events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrategyEvent {
    /// Local trading day changed and daily risk metrics were reset
    DailyReset { date: NaiveDate },
    /// Entry order sent after passing the risk gate
    EntrySubmitted {
        side: Side,
        quantity: u32,
        price: Decimal,
        stop: Decimal,
    },
    /// Entry filled and protective stop (and target, if configured) placed
    PositionOpened {
        side: Side,
        quantity: u32,
        entry_price: Decimal,
        stop: Decimal,
        target: Option<Decimal>,
    },
    /// Breakeven manager moved the stop
    StopMoved { step: usize, stop: Decimal },
    /// Position closed with realized P&L
    PositionClosed {
        side: Side,
        quantity: u32,
        exit_price: Decimal,
        pnl: Decimal,
    },
    /// Entry rejected by the risk gate or sizer
    TradeDenied { reason: DenialReason },
    /// Position closed at market outside the stop
    Flattened { reason: String },
    /// Risk manager notification
    Risk(RiskEvent),
}

/// Running counters for a strategy session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub ticks: u64,
    pub entries: u32,
    pub trades_closed: u32,
    pub wins: u32,
    pub losses: u32,
    pub realized_pnl: Decimal,
    pub stop_adjustments: u32,
    pub step_activations: u32,
    pub denials: u32,
}

impl StrategyStats {
    /// Share of closed trades with positive P&L, in percent
    pub fn win_rate(&self) -> Decimal {
        if self.trades_closed == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins) * Decimal::ONE_HUNDRED / Decimal::from(self.trades_closed)
    }
}
