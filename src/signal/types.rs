//! Signal types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Side;

/// An entry signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Direction to enter
    pub side: Side,
    /// Price the signal was computed on
    pub price: Decimal,
    /// Relative move over the lookback window
    pub momentum: Decimal,
    /// Tick timestamp
    pub timestamp: DateTime<Utc>,
}
