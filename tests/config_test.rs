//! Configuration loading integration tests

use rust_decimal_macros::dec;
use std::io::Write;
use tradeguard::config::Config;
use tradeguard::telemetry::LogFormat;
use tradeguard::ConfigError;

#[test]
fn test_load_example_config_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();

    assert_eq!(config.instrument.symbol, "ES 03-25");
    assert_eq!(config.instrument.point_value(), dec!(50));
    assert_eq!(config.risk.max_risk_per_trade, dec!(250));
    assert_eq!(config.breakeven_config().unwrap().num_steps(), 3);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
}

#[test]
fn test_load_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [instrument]
        symbol = "NQ"
        tick_size = 0.25
        tick_value = 5.0

        [account]
        initial_balance = 25000.0

        [breakeven]
        enabled = false
        profit_targets = [5.0]
        breakeven_offsets = [0.0]
        trailing_ticks = 3
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let breakeven = config.breakeven_config().unwrap();
    assert!(!breakeven.enabled());
    assert_eq!(breakeven.trailing_distance(), dec!(0.75));
    assert_eq!(config.account.initial_balance, dec!(25000));
}

#[test]
fn test_invalid_breakeven_fails_fast() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [instrument]
        symbol = "ES"
        tick_size = 0.25
        tick_value = 12.50

        [account]
        initial_balance = 50000.0

        [breakeven]
        profit_targets = [10.0, 7.0]
        breakeven_offsets = [0.0, 2.0]
        "#
    )
    .unwrap();

    let err = Config::load(file.path()).unwrap_err();
    let root = err.root_cause().downcast_ref::<ConfigError>();
    assert_eq!(root, Some(&ConfigError::TargetsNotAscending));
}

#[test]
fn test_malformed_toml_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[instrument\nsymbol = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_momentum_windows_beyond_history_rejected() {
    let base = include_str!("../config.toml.example");

    let config = base.replace("min_history = 50", "min_history = 150");
    let err = Config::from_toml(&config).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::CountOutOfRange {
            field: "min_history",
            value: 150,
            min: 0,
            max: 100,
        })
    );

    let config = base.replace("momentum_lookback = 20", "momentum_lookback = 1");
    assert!(Config::from_toml(&config).is_err());

    let config = base.replace("momentum_lookback = 20", "momentum_lookback = 100");
    assert!(Config::from_toml(&config).is_ok());
}
