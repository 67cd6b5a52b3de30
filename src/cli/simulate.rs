//! Simulate command implementation

use clap::Args;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::sim::{sample_path, Simulator};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Comma-separated price path; a built-in demo path is used when omitted
    #[arg(long, value_delimiter = ',')]
    pub prices: Option<Vec<Decimal>>,

    /// First price of the built-in path
    #[arg(long, default_value = "4500")]
    pub base_price: Decimal,

    /// Output format: json or table
    #[arg(long, default_value = "table")]
    pub format: String,
}

impl SimulateArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let prices = match &self.prices {
            Some(prices) if !prices.is_empty() => prices.clone(),
            _ => sample_path(self.base_price, config.instrument.tick_size),
        };

        let report = Simulator::new(config.clone()).run(&prices).await?;

        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&report)?),
            _ => println!("{}", report.format_table()),
        }
        Ok(())
    }
}
