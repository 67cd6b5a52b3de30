//! Auto-breakeven configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use crate::error::ConfigError;

/// Largest supported number of breakeven steps
pub const MAX_STEPS: usize = 3;

/// Validated breakeven template shared by every position it manages.
///
/// Step `i` activates once profit reaches `profit_targets[i]` and moves the
/// stop to `entry ± breakeven_offsets[i]`. Once a step is active the stop
/// trails the best price by `trailing_ticks * tick_size`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakevenConfig {
    num_steps: usize,
    profit_targets: Vec<Decimal>,
    breakeven_offsets: Vec<Decimal>,
    trailing_ticks: u32,
    tick_size: Decimal,
    enabled: bool,
}

impl BreakevenConfig {
    /// Create a validated configuration
    pub fn new(
        num_steps: usize,
        profit_targets: Vec<Decimal>,
        breakeven_offsets: Vec<Decimal>,
        trailing_ticks: u32,
        tick_size: Decimal,
        enabled: bool,
    ) -> Result<Self, ConfigError> {
        if !(1..=MAX_STEPS).contains(&num_steps) {
            return Err(ConfigError::StepCountOutOfRange(num_steps));
        }
        if profit_targets.len() != num_steps {
            return Err(ConfigError::StepListLength {
                field: "profit_targets",
                expected: num_steps,
                actual: profit_targets.len(),
            });
        }
        if breakeven_offsets.len() != num_steps {
            return Err(ConfigError::StepListLength {
                field: "breakeven_offsets",
                expected: num_steps,
                actual: breakeven_offsets.len(),
            });
        }
        if profit_targets.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::TargetsNotAscending);
        }
        if tick_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveTickSize(tick_size));
        }

        Ok(Self {
            num_steps,
            profit_targets,
            breakeven_offsets,
            trailing_ticks,
            tick_size,
            enabled,
        })
    }

    /// One step at +5 points, stop at entry, 3-tick trail
    pub fn conservative(tick_size: Decimal) -> Result<Self, ConfigError> {
        Self::new(1, vec![dec!(5)], vec![dec!(0)], 3, tick_size, true)
    }

    /// Two steps at +7/+10, stops at entry and entry+2, 2-tick trail
    pub fn moderate(tick_size: Decimal) -> Result<Self, ConfigError> {
        Self::new(
            2,
            vec![dec!(7), dec!(10)],
            vec![dec!(0), dec!(2)],
            2,
            tick_size,
            true,
        )
    }

    /// Three steps at +7/+10/+15, stops at entry, +2 and +4, 2-tick trail
    pub fn aggressive(tick_size: Decimal) -> Result<Self, ConfigError> {
        Self::new(
            3,
            vec![dec!(7), dec!(10), dec!(15)],
            vec![dec!(0), dec!(2), dec!(4)],
            2,
            tick_size,
            true,
        )
    }

    /// The moderate template with stop management switched off
    pub fn disabled(tick_size: Decimal) -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: false,
            ..Self::moderate(tick_size)?
        })
    }

    /// Same template for an instrument with a different tick size
    pub fn with_tick_size(self, tick_size: Decimal) -> Result<Self, ConfigError> {
        if tick_size <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveTickSize(tick_size));
        }
        Ok(Self { tick_size, ..self })
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn profit_targets(&self) -> &[Decimal] {
        &self.profit_targets
    }

    pub fn breakeven_offsets(&self) -> &[Decimal] {
        &self.breakeven_offsets
    }

    pub fn trailing_ticks(&self) -> u32 {
        self.trailing_ticks
    }

    pub fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Trailing distance in price points
    pub fn trailing_distance(&self) -> Decimal {
        Decimal::from(self.trailing_ticks) * self.tick_size
    }

    /// Profit target of 1-based `step`
    pub fn profit_target(&self, step: usize) -> Option<Decimal> {
        step.checked_sub(1)
            .and_then(|i| self.profit_targets.get(i))
            .copied()
    }

    /// Breakeven offset of 1-based `step`
    pub fn breakeven_offset(&self, step: usize) -> Option<Decimal> {
        step.checked_sub(1)
            .and_then(|i| self.breakeven_offsets.get(i))
            .copied()
    }
}

impl fmt::Display for BreakevenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Auto-Breakeven Configuration ({} steps):", self.num_steps)?;
        writeln!(f, "  Enabled: {}", self.enabled)?;
        writeln!(f, "  Tick Size: {}", self.tick_size)?;
        write!(
            f,
            "  Trailing: {} ticks ({:.2} points)",
            self.trailing_ticks,
            self.trailing_distance()
        )?;
        for (i, (target, offset)) in self
            .profit_targets
            .iter()
            .zip(&self.breakeven_offsets)
            .enumerate()
        {
            write!(
                f,
                "\n  Step {}: Profit target {:.2} -> Breakeven @ entry + {:.2}",
                i + 1,
                target,
                offset
            )?;
        }
        Ok(())
    }
}
