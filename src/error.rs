//! Configuration errors
//!
//! Invalid limits or breakeven settings are the only failure mode of the core
//! components. Everything else is expressed as data (decisions, events).

use rust_decimal::Decimal;
use thiserror::Error;

/// Raised when a `RiskLimits` or `BreakevenConfig` cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A limit that must be strictly positive was zero or negative
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },
    /// A value that must be zero or more was negative
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },
    /// A percentage outside (0, 100]
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: Decimal },
    /// Breakeven step count outside 1..=3
    #[error("num_steps must be between 1 and 3, got {0}")]
    StepCountOutOfRange(usize),
    /// A per-step list does not have one entry per step
    #[error("{field} must have {expected} elements, got {actual}")]
    StepListLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Profit targets must be strictly ascending
    #[error("profit_targets must be in ascending order")]
    TargetsNotAscending,
    /// Tick size must be strictly positive
    #[error("tick_size must be positive, got {0}")]
    NonPositiveTickSize(Decimal),
    /// A count outside its supported range
    #[error("{field} must be between {min} and {max}, got {value}")]
    CountOutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
    /// Only one end of the trading window was configured
    #[error("trading window needs both trading_start and trading_end")]
    IncompleteTradingWindow,
}
