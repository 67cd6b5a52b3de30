//! Check command implementation

use clap::Args;
use serde_json::json;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the effective configuration as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        config.validate()?;
        let breakeven = config.breakeven_config()?;

        if self.json {
            let out = json!({
                "instrument": config.instrument,
                "account": config.account,
                "risk": config.risk,
                "breakeven": breakeven,
                "strategy": config.strategy,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        let risk = &config.risk;
        println!("Configuration OK");
        println!(
            "  Instrument: {} (tick {} = ${}, ${} per point)",
            config.instrument.symbol,
            config.instrument.tick_size,
            config.instrument.tick_value,
            config.instrument.point_value()
        );
        println!("  Account Balance: ${:.2}", config.account.initial_balance);
        println!("Risk Limits:");
        println!("  Max Risk Per Trade: ${:.2}", risk.max_risk_per_trade);
        println!("  Max Daily Loss: ${:.2}", risk.max_daily_loss);
        println!("  Max Total Loss: ${:.2}", risk.max_total_loss);
        println!("  Risk % Per Trade: {}%", risk.risk_per_trade_pct);
        println!(
            "  Contracts: {} per trade, {} total, {} instruments",
            risk.max_contracts_per_trade, risk.max_total_contracts, risk.max_instruments
        );
        if let Some(target) = risk.daily_profit_target {
            println!("  Daily Profit Target: ${target:.2}");
        }
        match risk.trading_window() {
            Some((start, end)) => println!("  Trading Hours: {start} - {end}"),
            None => println!("  Trading Hours: unrestricted"),
        }
        println!(
            "  Max Consecutive Losses: {} (cool-down {}s)",
            risk.max_consecutive_losses, risk.cool_down_secs
        );
        println!("{breakeven}");
        Ok(())
    }
}
