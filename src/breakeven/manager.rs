//! Auto-breakeven and trailing stop state machine
//!
//! One manager per open position. `initialize_position` moves it from Idle to
//! Tracking, each `update` may activate the next step or trail the stop, and
//! `reset` returns it to Idle when the position is flattened.
//!
//! Invariants while tracking:
//! - the stop never moves against the position
//! - once a step is active the trailing stop never crosses that step's
//!   breakeven level
//! - at most one step activates per `update` call

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::BreakevenConfig;
use crate::types::Side;

/// Stop-management event produced by `update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BreakevenEvent {
    /// A profit target was reached and its step is now active
    StepActivated {
        step: usize,
        price: Decimal,
        breakeven_level: Decimal,
    },
    /// The stop was moved
    StopAdjusted {
        step: usize,
        old_stop: Decimal,
        new_stop: Decimal,
        trailing: bool,
    },
}

/// Coarse lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakevenState {
    /// No tracked position
    Idle,
    /// Tracking a position; `step` is 0 until the first target is reached
    Tracking { step: usize },
}

/// Snapshot of a tracked position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedStatus {
    pub side: Side,
    pub entry_price: Decimal,
    pub current_stop: Decimal,
    pub initial_stop: Decimal,
    pub current_step: usize,
    pub num_steps: usize,
    pub stop_adjustments: u32,
    /// Highest price for longs, lowest for shorts
    pub extreme_price: Decimal,
}

/// Status report for logs and operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BreakevenStatus {
    Idle,
    Tracking(TrackedStatus),
}

impl fmt::Display for BreakevenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakevenStatus::Idle => write!(f, "No active position"),
            BreakevenStatus::Tracking(s) => {
                let extreme_label = match s.side {
                    Side::Long => "High",
                    Side::Short => "Low",
                };
                write!(
                    f,
                    "Side: {} | Entry: {:.2} | Current Stop: {:.2} | Step: {}/{} | Adjustments: {} | {}: {:.2}",
                    s.side,
                    s.entry_price,
                    s.current_stop,
                    s.current_step,
                    s.num_steps,
                    s.stop_adjustments,
                    extreme_label,
                    s.extreme_price
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedPosition {
    side: Side,
    entry_price: Decimal,
    initial_stop: Decimal,
    current_stop: Decimal,
    current_step: usize,
    extreme_price: Decimal,
    step_activations: BTreeMap<usize, DateTime<Utc>>,
    stop_adjustments: u32,
}

/// Advances a position's stop through breakeven steps, then trails it
#[derive(Debug, Clone)]
pub struct BreakevenManager {
    config: BreakevenConfig,
    position: Option<TrackedPosition>,
    events: Vec<BreakevenEvent>,
}

impl BreakevenManager {
    pub fn new(config: BreakevenConfig) -> Self {
        Self {
            config,
            position: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &BreakevenConfig {
        &self.config
    }

    /// Start tracking a new position, discarding any previous state
    pub fn initialize_position(&mut self, entry_price: Decimal, stop_loss: Decimal, side: Side) {
        self.reset();
        self.position = Some(TrackedPosition {
            side,
            entry_price,
            initial_stop: stop_loss,
            current_stop: stop_loss,
            current_step: 0,
            extreme_price: entry_price,
            step_activations: BTreeMap::new(),
            stop_adjustments: 0,
        });

        tracing::info!(
            %side,
            entry = %entry_price,
            initial_stop = %stop_loss,
            risk_points = %(entry_price - stop_loss).abs(),
            "Breakeven tracking started"
        );
    }

    /// Feed a price; returns the new stop when it should move
    pub fn update(&mut self, current_price: Decimal) -> Option<Decimal> {
        self.update_at(current_price, Utc::now())
    }

    /// Feed a price observed at `now`
    pub fn update_at(&mut self, current_price: Decimal, now: DateTime<Utc>) -> Option<Decimal> {
        if !self.config.enabled() {
            return None;
        }
        let Some(pos) = self.position.as_mut() else {
            tracing::debug!(price = %current_price, "Breakeven update ignored, no position");
            return None;
        };

        let side = pos.side;
        pos.extreme_price = side.best(pos.extreme_price, current_price);
        let profit = side.profit(pos.entry_price, current_price);

        let mut proposed: Option<Decimal> = None;
        let mut trailing = false;

        if pos.current_step < self.config.num_steps() {
            let target = self.config.profit_targets()[pos.current_step];
            if profit >= target {
                pos.current_step += 1;
                let step = pos.current_step;
                let level = step_level(&self.config, pos.entry_price, side, step);
                pos.step_activations.insert(step, now);
                proposed = Some(level);

                tracing::info!(
                    step,
                    profit = %profit,
                    target = %target,
                    breakeven_level = %level,
                    "Breakeven step activated"
                );
                self.events.push(BreakevenEvent::StepActivated {
                    step,
                    price: current_price,
                    breakeven_level: level,
                });
            }
        }

        if pos.current_step > 0 {
            let level = step_level(&self.config, pos.entry_price, side, pos.current_step);
            let raw = side.offset(pos.extreme_price, -self.config.trailing_distance());
            let trailing_stop = side.best(raw, level);

            let beats_current = side.is_better(trailing_stop, pos.current_stop);
            let beats_step = proposed.map_or(true, |p| side.is_better(trailing_stop, p));
            if beats_current && beats_step {
                proposed = Some(trailing_stop);
                trailing = true;
            }
        }

        let new_stop = proposed.filter(|stop| side.is_better(*stop, pos.current_stop))?;

        let old_stop = pos.current_stop;
        pos.current_stop = new_stop;
        pos.stop_adjustments += 1;

        tracing::info!(
            step = pos.current_step,
            old_stop = %old_stop,
            new_stop = %new_stop,
            extreme = %pos.extreme_price,
            trailing,
            "Stop adjusted"
        );
        self.events.push(BreakevenEvent::StopAdjusted {
            step: pos.current_step,
            old_stop,
            new_stop,
            trailing,
        });

        Some(new_stop)
    }

    /// Stop tracking and clear all position state
    pub fn reset(&mut self) {
        if let Some(pos) = self.position.take() {
            tracing::debug!(
                steps = pos.current_step,
                adjustments = pos.stop_adjustments,
                "Breakeven tracking reset"
            );
        }
    }

    /// Drain events produced by `update`
    pub fn take_events(&mut self) -> Vec<BreakevenEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> BreakevenState {
        match &self.position {
            None => BreakevenState::Idle,
            Some(pos) => BreakevenState::Tracking {
                step: pos.current_step,
            },
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.position.is_some()
    }

    pub fn get_status(&self) -> BreakevenStatus {
        match &self.position {
            None => BreakevenStatus::Idle,
            Some(pos) => BreakevenStatus::Tracking(TrackedStatus {
                side: pos.side,
                entry_price: pos.entry_price,
                current_stop: pos.current_stop,
                initial_stop: pos.initial_stop,
                current_step: pos.current_step,
                num_steps: self.config.num_steps(),
                stop_adjustments: pos.stop_adjustments,
                extreme_price: pos.extreme_price,
            }),
        }
    }

    pub fn entry_price(&self) -> Option<Decimal> {
        self.position.as_ref().map(|p| p.entry_price)
    }

    pub fn side(&self) -> Option<Side> {
        self.position.as_ref().map(|p| p.side)
    }

    pub fn current_stop(&self) -> Option<Decimal> {
        self.position.as_ref().map(|p| p.current_stop)
    }

    pub fn current_step(&self) -> usize {
        self.position.as_ref().map_or(0, |p| p.current_step)
    }

    pub fn stop_adjustments(&self) -> u32 {
        self.position.as_ref().map_or(0, |p| p.stop_adjustments)
    }

    /// When each step (1-based) was activated
    pub fn step_activation_times(&self) -> BTreeMap<usize, DateTime<Utc>> {
        self.position
            .as_ref()
            .map(|p| p.step_activations.clone())
            .unwrap_or_default()
    }
}

/// Breakeven level of 1-based `step`: entry shifted by the step offset in the
/// favorable direction
fn step_level(config: &BreakevenConfig, entry: Decimal, side: Side, step: usize) -> Decimal {
    side.offset(entry, config.breakeven_offsets()[step - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn three_step(trailing_ticks: u32) -> BreakevenConfig {
        BreakevenConfig::new(
            3,
            vec![dec!(7), dec!(10), dec!(15)],
            vec![dec!(0), dec!(2), dec!(4)],
            trailing_ticks,
            dec!(0.25),
            true,
        )
        .unwrap()
    }

    fn feed(manager: &mut BreakevenManager, prices: &[Decimal]) -> Vec<Option<Decimal>> {
        prices.iter().map(|p| manager.update(*p)).collect()
    }

    #[test]
    fn test_update_before_initialize_is_noop() {
        let mut manager = BreakevenManager::new(three_step(2));
        assert_eq!(manager.update(dec!(200)), None);
        assert_eq!(manager.state(), BreakevenState::Idle);
        assert!(manager.take_events().is_empty());
    }

    #[test]
    fn test_disabled_config_never_moves_stop() {
        let mut manager = BreakevenManager::new(BreakevenConfig::disabled(dec!(0.25)).unwrap());
        manager.initialize_position(dec!(110), dec!(103), Side::Long);
        assert_eq!(manager.update(dec!(150)), None);
        assert_eq!(manager.current_step(), 0);
        assert_eq!(manager.current_stop(), Some(dec!(103)));
    }

    #[test]
    fn test_long_three_step_with_tight_trail() {
        let mut manager = BreakevenManager::new(three_step(2));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);

        let stops = feed(
            &mut manager,
            &[
                dec!(110),
                dec!(112),
                dec!(115),
                dec!(117),
                dec!(120),
                dec!(125),
                dec!(127),
                dec!(126.5),
            ],
        );

        assert_eq!(
            stops,
            vec![
                None,
                None,
                None,
                Some(dec!(116.5)),
                Some(dec!(119.5)),
                Some(dec!(124.5)),
                Some(dec!(126.5)),
                None,
            ]
        );
        assert_eq!(manager.current_step(), 3);
        assert_eq!(manager.stop_adjustments(), 4);
        assert!(manager.current_stop().unwrap() >= dec!(114));
    }

    #[test]
    fn test_long_three_step_with_wide_trail_lands_on_step_levels() {
        let mut manager = BreakevenManager::new(three_step(100));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);

        let stops = feed(
            &mut manager,
            &[
                dec!(110),
                dec!(112),
                dec!(115),
                dec!(117),
                dec!(120),
                dec!(125),
                dec!(127),
                dec!(126.5),
            ],
        );

        assert_eq!(
            stops,
            vec![
                None,
                None,
                None,
                Some(dec!(110)),
                Some(dec!(112)),
                Some(dec!(114)),
                None,
                None,
            ]
        );
        assert_eq!(manager.current_stop(), Some(dec!(114)));
    }

    #[test]
    fn test_short_mirror() {
        let config = BreakevenConfig::moderate(dec!(0.25)).unwrap();
        let mut manager = BreakevenManager::new(config);
        manager.initialize_position(dec!(110), dec!(117), Side::Short);

        let stops = feed(
            &mut manager,
            &[dec!(108), dec!(103), dec!(102), dec!(100), dec!(99), dec!(99.5)],
        );

        assert_eq!(
            stops,
            vec![
                None,
                Some(dec!(103.5)),
                Some(dec!(102.5)),
                Some(dec!(100.5)),
                Some(dec!(99.5)),
                None,
            ]
        );
        assert_eq!(manager.current_step(), 2);
    }

    #[test]
    fn test_short_wide_trail_uses_ceiling() {
        let config = BreakevenConfig::new(
            2,
            vec![dec!(7), dec!(10)],
            vec![dec!(0), dec!(2)],
            100,
            dec!(0.25),
            true,
        )
        .unwrap();
        let mut manager = BreakevenManager::new(config);
        manager.initialize_position(dec!(110), dec!(117), Side::Short);

        assert_eq!(manager.update(dec!(103)), Some(dec!(110)));
        assert_eq!(manager.update(dec!(100)), Some(dec!(108)));
        assert_eq!(manager.update(dec!(95)), None);
        assert_eq!(manager.current_stop(), Some(dec!(108)));
    }

    #[test]
    fn test_one_step_per_update() {
        let mut manager = BreakevenManager::new(three_step(100));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);

        // +20 clears every target but only step 1 activates
        assert_eq!(manager.update(dec!(130)), Some(dec!(110)));
        assert_eq!(manager.current_step(), 1);
        assert_eq!(manager.update(dec!(130)), Some(dec!(112)));
        assert_eq!(manager.current_step(), 2);
        assert_eq!(manager.update(dec!(130)), Some(dec!(114)));
        assert_eq!(manager.current_step(), 3);
        assert_eq!(manager.update(dec!(130)), None);
    }

    #[test]
    fn test_deferred_step_never_regresses_stop() {
        let mut manager = BreakevenManager::new(three_step(2));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);

        // Jump activates step 1 and trails to 129.5
        assert_eq!(manager.update(dec!(130)), Some(dec!(129.5)));
        // Pullback activates step 2 at level 112, below the trailed stop
        assert_eq!(manager.update(dec!(121)), None);
        assert_eq!(manager.current_step(), 2);
        assert_eq!(manager.current_stop(), Some(dec!(129.5)));
    }

    #[test]
    fn test_pullback_does_not_lower_stop() {
        let mut manager = BreakevenManager::new(three_step(2));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);
        manager.update(dec!(117));
        let stop = manager.current_stop().unwrap();

        for price in [dec!(116), dec!(112), dec!(108)] {
            assert_eq!(manager.update(price), None);
        }
        assert_eq!(manager.current_stop(), Some(stop));
    }

    #[test]
    fn test_events_and_activation_times() {
        let mut manager = BreakevenManager::new(three_step(100));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);
        let t1 = Utc::now();
        manager.update_at(dec!(117), t1);

        assert_eq!(
            manager.take_events(),
            vec![
                BreakevenEvent::StepActivated {
                    step: 1,
                    price: dec!(117),
                    breakeven_level: dec!(110),
                },
                BreakevenEvent::StopAdjusted {
                    step: 1,
                    old_stop: dec!(103),
                    new_stop: dec!(110),
                    trailing: false,
                },
            ]
        );
        assert_eq!(manager.step_activation_times().get(&1), Some(&t1));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut manager = BreakevenManager::new(three_step(2));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);
        manager.update(dec!(120));
        manager.reset();

        assert_eq!(manager.state(), BreakevenState::Idle);
        assert_eq!(manager.get_status(), BreakevenStatus::Idle);
        assert_eq!(manager.get_status().to_string(), "No active position");
        assert_eq!(manager.update(dec!(140)), None);
        assert_eq!(manager.stop_adjustments(), 0);
        assert!(manager.step_activation_times().is_empty());

        // Reset is idempotent
        manager.reset();
        assert_eq!(manager.state(), BreakevenState::Idle);
    }

    #[test]
    fn test_initialize_clears_previous_position() {
        let mut manager = BreakevenManager::new(three_step(2));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);
        manager.update(dec!(125));

        manager.initialize_position(dec!(200), dec!(207), Side::Short);
        assert_eq!(manager.state(), BreakevenState::Tracking { step: 0 });
        assert_eq!(manager.side(), Some(Side::Short));
        assert_eq!(manager.current_stop(), Some(dec!(207)));
        assert_eq!(manager.stop_adjustments(), 0);
    }

    #[test]
    fn test_status_display() {
        let mut manager = BreakevenManager::new(three_step(2));
        manager.initialize_position(dec!(110), dec!(103), Side::Long);
        manager.update(dec!(117));

        let status = manager.get_status().to_string();
        assert_eq!(
            status,
            "Side: LONG | Entry: 110.00 | Current Stop: 116.50 | Step: 1/3 | Adjustments: 1 | High: 117.00"
        );
    }
}
