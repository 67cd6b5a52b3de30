//! Rolling-window momentum entry signal
//!
//! Momentum is the relative move between the first and last price of the
//! lookback window: `(last - first) / first`. Above `threshold` signals a long
//! entry, below `-threshold` a short one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::Signal;
use crate::error::ConfigError;
use crate::types::Side;

/// Prices retained by the rolling buffer
pub const HISTORY_CAPACITY: usize = 100;

/// Configuration for momentum detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Prices spanned by the momentum calculation (default: 20)
    pub lookback: usize,
    /// Prices required before any signal (default: 50)
    pub min_history: usize,
    /// Minimum relative move (default: 0.2%)
    pub threshold: Decimal,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            min_history: 50,
            threshold: dec!(0.002),
        }
    }
}

impl MomentumConfig {
    /// Both windows must fit in the rolling buffer, or no signal is ever produced
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=HISTORY_CAPACITY).contains(&self.lookback) {
            return Err(ConfigError::CountOutOfRange {
                field: "momentum_lookback",
                value: self.lookback,
                min: 2,
                max: HISTORY_CAPACITY,
            });
        }
        if self.min_history > HISTORY_CAPACITY {
            return Err(ConfigError::CountOutOfRange {
                field: "min_history",
                value: self.min_history,
                min: 0,
                max: HISTORY_CAPACITY,
            });
        }
        if self.threshold <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "momentum_threshold",
                value: self.threshold,
            });
        }
        Ok(())
    }
}

/// Momentum detector over a bounded price history
#[derive(Debug, Clone)]
pub struct MomentumSignal {
    config: MomentumConfig,
    prices: VecDeque<Decimal>,
}

impl MomentumSignal {
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            config,
            prices: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }

    /// Add a price observation, evicting the oldest beyond capacity
    pub fn update(&mut self, price: Decimal) {
        if self.prices.len() == HISTORY_CAPACITY {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    /// Whether enough history has accumulated to signal
    pub fn is_ready(&self) -> bool {
        self.prices.len() >= self.config.min_history.max(2)
    }

    pub fn sample_count(&self) -> usize {
        self.prices.len()
    }

    /// Current momentum over the lookback window
    pub fn momentum(&self) -> Option<Decimal> {
        if !self.is_ready() {
            return None;
        }
        let window = self.config.lookback.clamp(2, self.prices.len());
        let first = *self.prices.get(self.prices.len() - window)?;
        let last = *self.prices.back()?;
        if first.is_zero() {
            return None;
        }
        Some((last - first) / first)
    }

    /// Signal for the latest price, if momentum clears the threshold
    pub fn detect(&self, timestamp: DateTime<Utc>) -> Option<Signal> {
        let momentum = self.momentum()?;
        let side = if momentum > self.config.threshold {
            Side::Long
        } else if momentum < -self.config.threshold {
            Side::Short
        } else {
            return None;
        };

        let price = *self.prices.back()?;
        tracing::debug!(%side, %momentum, %price, "Momentum signal");
        Some(Signal {
            side,
            price,
            momentum,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(lookback: usize, min_history: usize) -> MomentumSignal {
        MomentumSignal::new(MomentumConfig {
            lookback,
            min_history,
            threshold: dec!(0.002),
        })
    }

    #[test]
    fn test_not_ready_without_history() {
        let mut signal = detector(5, 10);
        for _ in 0..9 {
            signal.update(dec!(100));
        }
        assert!(!signal.is_ready());
        assert!(signal.detect(Utc::now()).is_none());

        signal.update(dec!(100));
        assert!(signal.is_ready());
    }

    #[test]
    fn test_long_signal_on_rise() {
        let mut signal = detector(3, 3);
        for price in [dec!(100), dec!(100.1), dec!(100.5)] {
            signal.update(price);
        }
        let detected = signal.detect(Utc::now()).unwrap();
        assert_eq!(detected.side, Side::Long);
        assert_eq!(detected.price, dec!(100.5));
        assert_eq!(detected.momentum, dec!(0.005));
    }

    #[test]
    fn test_short_signal_on_fall() {
        let mut signal = detector(3, 3);
        for price in [dec!(100), dec!(99.9), dec!(99.5)] {
            signal.update(price);
        }
        assert_eq!(signal.detect(Utc::now()).unwrap().side, Side::Short);
    }

    #[test]
    fn test_flat_prices_no_signal() {
        let mut signal = detector(3, 3);
        for price in [dec!(100), dec!(100.1), dec!(100.2)] {
            signal.update(price);
        }
        // 0.2% exactly is not above the threshold
        assert_eq!(signal.momentum(), Some(dec!(0.002)));
        assert!(signal.detect(Utc::now()).is_none());
    }

    #[test]
    fn test_lookback_uses_recent_window() {
        let mut signal = detector(2, 3);
        for price in [dec!(50), dec!(100), dec!(100)] {
            signal.update(price);
        }
        // Only the last two prices count
        assert_eq!(signal.momentum(), Some(dec!(0)));
    }

    #[test]
    fn test_config_windows_must_fit_history() {
        assert!(MomentumConfig::default().validate().is_ok());

        let too_long = MomentumConfig {
            min_history: HISTORY_CAPACITY + 50,
            ..Default::default()
        };
        assert_eq!(
            too_long.validate(),
            Err(ConfigError::CountOutOfRange {
                field: "min_history",
                value: 150,
                min: 0,
                max: HISTORY_CAPACITY,
            })
        );

        for lookback in [0, 1, HISTORY_CAPACITY + 1] {
            let config = MomentumConfig {
                lookback,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "lookback={lookback}");
        }
    }

    #[test]
    fn test_capacity_bound() {
        let mut signal = detector(20, 50);
        for i in 0..250u32 {
            signal.update(Decimal::from(i));
        }
        assert_eq!(signal.sample_count(), HISTORY_CAPACITY);
    }
}
