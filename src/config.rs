//! Configuration types for tradeguard

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::breakeven::BreakevenConfig;
use crate::error::ConfigError;
use crate::risk::RiskLimits;
use crate::signal::MomentumConfig;
use crate::telemetry::LogFormat;
use crate::types::InstrumentSpec;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub instrument: InstrumentSpec,
    pub account: AccountConfig,
    #[serde(default)]
    pub risk: RiskLimits,
    #[serde(default)]
    pub breakeven: BreakevenSection,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub initial_balance: Decimal,
}

/// Breakeven settings as written in the file; the tick size comes from `[instrument]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakevenSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Must agree with the list lengths when given
    #[serde(default)]
    pub num_steps: Option<usize>,

    #[serde(default = "default_profit_targets")]
    pub profit_targets: Vec<Decimal>,

    #[serde(default = "default_breakeven_offsets")]
    pub breakeven_offsets: Vec<Decimal>,

    #[serde(default = "default_trailing_ticks")]
    pub trailing_ticks: u32,
}

fn default_true() -> bool {
    true
}
fn default_profit_targets() -> Vec<Decimal> {
    vec![dec!(7), dec!(10)]
}
fn default_breakeven_offsets() -> Vec<Decimal> {
    vec![dec!(0), dec!(2)]
}
fn default_trailing_ticks() -> u32 {
    2
}

impl Default for BreakevenSection {
    fn default() -> Self {
        Self {
            enabled: true,
            num_steps: None,
            profit_targets: default_profit_targets(),
            breakeven_offsets: default_breakeven_offsets(),
            trailing_ticks: default_trailing_ticks(),
        }
    }
}

impl BreakevenSection {
    /// Build the validated breakeven config for an instrument
    pub fn build(&self, tick_size: Decimal) -> Result<BreakevenConfig, ConfigError> {
        BreakevenConfig::new(
            self.num_steps.unwrap_or(self.profit_targets.len()),
            self.profit_targets.clone(),
            self.breakeven_offsets.clone(),
            self.trailing_ticks,
            tick_size,
            self.enabled,
        )
    }
}

/// Entry strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Initial stop distance in ticks
    #[serde(default = "default_stop_loss_ticks")]
    pub stop_loss_ticks: u32,

    /// Upper bound on contracts per entry
    #[serde(default = "default_entry_quantity")]
    pub entry_quantity: u32,

    /// Prices spanned by the momentum calculation
    #[serde(default = "default_momentum_lookback")]
    pub momentum_lookback: usize,

    /// Prices required before the first signal
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Relative move that triggers an entry
    #[serde(default = "default_momentum_threshold")]
    pub momentum_threshold: Decimal,

    /// Minimum seconds between entries; 0 disables throttling
    #[serde(default = "default_min_trade_interval_secs")]
    pub min_trade_interval_secs: u64,

    /// Take-profit distance as a multiple of the stop distance; 0 places no target
    #[serde(default = "default_take_profit_multiple")]
    pub take_profit_multiple: Decimal,
}

fn default_stop_loss_ticks() -> u32 {
    8
}
fn default_entry_quantity() -> u32 {
    3
}
fn default_momentum_lookback() -> usize {
    20
}
fn default_min_history() -> usize {
    50
}
fn default_momentum_threshold() -> Decimal {
    dec!(0.002)
}
fn default_min_trade_interval_secs() -> u64 {
    60
}
fn default_take_profit_multiple() -> Decimal {
    dec!(3)
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            stop_loss_ticks: default_stop_loss_ticks(),
            entry_quantity: default_entry_quantity(),
            momentum_lookback: default_momentum_lookback(),
            min_history: default_min_history(),
            momentum_threshold: default_momentum_threshold(),
            min_trade_interval_secs: default_min_trade_interval_secs(),
            take_profit_multiple: default_take_profit_multiple(),
        }
    }
}

impl StrategyConfig {
    pub fn momentum(&self) -> MomentumConfig {
        MomentumConfig {
            lookback: self.momentum_lookback,
            min_history: self.min_history,
            threshold: self.momentum_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stop_loss_ticks == 0 {
            return Err(ConfigError::NonPositive {
                field: "stop_loss_ticks",
                value: Decimal::ZERO,
            });
        }
        if self.entry_quantity == 0 {
            return Err(ConfigError::NonPositive {
                field: "entry_quantity",
                value: Decimal::ZERO,
            });
        }
        if self.take_profit_multiple < Decimal::ZERO {
            return Err(ConfigError::Negative {
                field: "take_profit_multiple",
                value: self.take_profit_multiple,
            });
        }
        self.momentum().validate()
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; no exporter when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.instrument.validate()?;
        if self.account.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                field: "initial_balance",
                value: self.account.initial_balance,
            });
        }
        self.risk.validate()?;
        self.breakeven_config()?;
        self.strategy.validate()
    }

    pub fn risk_limits(&self) -> Arc<RiskLimits> {
        Arc::new(self.risk.clone())
    }

    pub fn breakeven_config(&self) -> Result<BreakevenConfig, ConfigError> {
        self.breakeven.build(self.instrument.tick_size)
    }
}
