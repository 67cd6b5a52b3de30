//! Benchmarks for the per-tick risk path

use chrono::{Local, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tradeguard::breakeven::{BreakevenConfig, BreakevenManager};
use tradeguard::risk::{PositionSizer, RiskLimits, RiskManager};
use tradeguard::Side;

fn benchmark_breakeven_update(c: &mut Criterion) {
    let config = BreakevenConfig::aggressive(dec!(0.25)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap();
    let prices = [dec!(4501), dec!(4508), dec!(4506), dec!(4512), dec!(4517), dec!(4514)];

    c.bench_function("breakeven_update_path", |b| {
        b.iter(|| {
            let mut manager = BreakevenManager::new(config.clone());
            manager.initialize_position(dec!(4500), dec!(4498), Side::Long);
            for price in prices {
                black_box(manager.update_at(black_box(price), now));
            }
            manager.take_events()
        })
    });
}

fn benchmark_can_trade(c: &mut Criterion) {
    let limits = Arc::new(RiskLimits::default());
    let mut manager = RiskManager::new(limits, dec!(50000)).unwrap();
    let now = Local::now();

    c.bench_function("risk_can_trade", |b| {
        b.iter(|| manager.can_trade_at(black_box("ES"), black_box(1), now))
    });
}

fn benchmark_position_size(c: &mut Criterion) {
    let sizer = PositionSizer::new(dec!(50000), Arc::new(RiskLimits::default())).unwrap();

    c.bench_function("position_size", |b| {
        b.iter(|| {
            sizer.calculate_position_size(
                black_box(dec!(4500)),
                black_box(dec!(4495)),
                dec!(0.25),
                dec!(12.50),
                Some(3),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_breakeven_update,
    benchmark_can_trade,
    benchmark_position_size
);
criterion_main!(benches);
