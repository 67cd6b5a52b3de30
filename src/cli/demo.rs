//! Breakeven demo command implementation

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::breakeven::{BreakevenConfig, BreakevenManager};
use crate::types::Side;

/// Position side for the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoSide {
    Long,
    Short,
}

#[derive(Args, Debug)]
pub struct BreakevenDemoArgs {
    /// Position side to demonstrate
    #[arg(long, value_enum, default_value = "long")]
    pub side: DemoSide,

    /// Instrument tick size
    #[arg(long, default_value = "0.25")]
    pub tick_size: Decimal,
}

impl BreakevenDemoArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let (side, config, initial_stop, path) = match self.side {
            DemoSide::Long => (
                Side::Long,
                BreakevenConfig::aggressive(self.tick_size)?,
                dec!(103),
                vec![
                    (dec!(110), "Entry"),
                    (dec!(112), "Moving up +2"),
                    (dec!(115), "Moving up +5"),
                    (dec!(117), "Step 1 target reached (+7)"),
                    (dec!(118), "Continue up +8"),
                    (dec!(120), "Step 2 target reached (+10)"),
                    (dec!(122), "Continue up +12"),
                    (dec!(125), "Step 3 target reached (+15)"),
                    (dec!(127), "Peak at +17"),
                    (dec!(126.5), "Slight pullback"),
                    (dec!(126), "More pullback"),
                ],
            ),
            DemoSide::Short => (
                Side::Short,
                BreakevenConfig::moderate(self.tick_size)?,
                dec!(117),
                vec![
                    (dec!(110), "Entry"),
                    (dec!(108), "Moving down -2"),
                    (dec!(105), "Moving down -5"),
                    (dec!(103), "Step 1 target reached (-7)"),
                    (dec!(102), "Continue down -8"),
                    (dec!(100), "Step 2 target reached (-10)"),
                    (dec!(98), "Continue down -12"),
                    (dec!(97), "Bottom at -13"),
                    (dec!(97.5), "Slight bounce"),
                    (dec!(98.5), "More bounce"),
                ],
            ),
        };
        let entry = dec!(110);

        println!("{config}\n");
        let mut manager = BreakevenManager::new(config);
        manager.initialize_position(entry, initial_stop, side);

        for (price, description) in path {
            println!("Price: {price:.2} - {description}");
            match manager.update(price) {
                Some(stop) => println!("  STOP LOSS UPDATED TO: {stop:.2}"),
                None => println!("  Stop unchanged"),
            }
            println!("  Unrealized P&L: {:.2} points", side.profit(entry, price));
            println!("  {}", manager.get_status());
        }

        let final_stop = manager.current_stop().unwrap_or(initial_stop);
        println!();
        println!("Total Stop Adjustments: {}", manager.stop_adjustments());
        println!(
            "Steps Activated: {}/{}",
            manager.current_step(),
            manager.config().num_steps()
        );
        println!("Final Stop Loss: {final_stop:.2}");
        println!(
            "Improvement: {:.2} points",
            side.profit(initial_stop, final_stop)
        );
        Ok(())
    }
}

