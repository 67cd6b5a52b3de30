//! CLI interface for tradeguard
//!
//! Provides subcommands for:
//! - `simulate`: Replay a price path through the strategy and paper broker
//! - `breakeven-demo`: Step through the breakeven stop logic on a scripted path
//! - `check`: Validate the configuration and print the effective limits

mod check;
mod demo;
mod simulate;

pub use check::CheckArgs;
pub use demo::{BreakevenDemoArgs, DemoSide};
pub use simulate::SimulateArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tradeguard")]
#[command(about = "Risk gating, position sizing and auto-breakeven stops for futures strategies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a price path through the strategy
    Simulate(SimulateArgs),
    /// Demonstrate breakeven stop management
    BreakevenDemo(BreakevenDemoArgs),
    /// Validate configuration and show effective settings
    Check(CheckArgs),
}
