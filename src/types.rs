//! Shared trading types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Direction of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Profits when price rises
    Long,
    /// Profits when price falls
    Short,
}

impl Side {
    /// Build from the `is_long` flag used by broker callbacks
    pub fn from_is_long(is_long: bool) -> Self {
        if is_long {
            Side::Long
        } else {
            Side::Short
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    /// Profit in points of moving from `entry` to `price`
    pub fn profit(self, entry: Decimal, price: Decimal) -> Decimal {
        match self {
            Side::Long => price - entry,
            Side::Short => entry - price,
        }
    }

    /// Shift `price` by `points` in the favorable direction
    pub fn offset(self, price: Decimal, points: Decimal) -> Decimal {
        match self {
            Side::Long => price + points,
            Side::Short => price - points,
        }
    }

    /// True when `candidate` is strictly more favorable than `reference`
    /// (higher for longs, lower for shorts)
    pub fn is_better(self, candidate: Decimal, reference: Decimal) -> bool {
        match self {
            Side::Long => candidate > reference,
            Side::Short => candidate < reference,
        }
    }

    /// The more favorable of two prices
    pub fn best(self, a: Decimal, b: Decimal) -> Decimal {
        if self.is_better(b, a) {
            b
        } else {
            a
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Contract specification for a traded instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Instrument symbol (e.g., "ES 03-25")
    pub symbol: String,
    /// Smallest price increment
    pub tick_size: Decimal,
    /// Dollar value of one tick per contract
    pub tick_value: Decimal,
}

impl InstrumentSpec {
    /// Create a validated instrument spec
    pub fn new(
        symbol: impl Into<String>,
        tick_size: Decimal,
        tick_value: Decimal,
    ) -> Result<Self, ConfigError> {
        let spec = Self {
            symbol: symbol.into(),
            tick_size,
            tick_value,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveTickSize(self.tick_size));
        }
        if self.tick_value <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "tick_value",
                value: self.tick_value,
            });
        }
        Ok(())
    }

    /// Dollar value of a one point move for one contract
    pub fn point_value(&self) -> Decimal {
        self.tick_value / self.tick_size
    }

    /// Convert a tick count into price points
    pub fn ticks_to_points(&self, ticks: u32) -> Decimal {
        Decimal::from(ticks) * self.tick_size
    }
}
