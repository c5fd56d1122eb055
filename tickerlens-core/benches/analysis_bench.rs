//! Criterion benchmarks for TickerLens hot paths.
//!
//! Benchmarks:
//! 1. Indicator series (SMA, EMA, RSI, Bollinger, MACD)
//! 2. Full analysis of one ticker (snapshot + signals)
//! 3. Opportunity scoring

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tickerlens_core::domain::{Candle, Quote};
use tickerlens_core::indicators::{bollinger_bands, macd, Ema, Indicator, Rsi, Sma};
use tickerlens_core::{analyze, score_opportunity};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Candle {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

fn make_closes(n: usize) -> Vec<f64> {
    make_candles(n).iter().map(|c| c.close).collect()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for &n in &[252usize, 1260] {
        let closes = make_closes(n);
        group.bench_with_input(BenchmarkId::new("sma200", n), &closes, |b, closes| {
            b.iter(|| Sma::new(200).compute(black_box(closes)))
        });
        group.bench_with_input(BenchmarkId::new("ema26", n), &closes, |b, closes| {
            b.iter(|| Ema::new(26).compute(black_box(closes)))
        });
        group.bench_with_input(BenchmarkId::new("rsi14", n), &closes, |b, closes| {
            b.iter(|| Rsi::new(14).compute(black_box(closes)))
        });
        group.bench_with_input(BenchmarkId::new("bollinger20", n), &closes, |b, closes| {
            b.iter(|| bollinger_bands(black_box(closes), 20, 2.0))
        });
        group.bench_with_input(BenchmarkId::new("macd", n), &closes, |b, closes| {
            b.iter(|| macd(black_box(closes), 12, 26, 9))
        });
    }
    group.finish();
}

// ── 2. Analysis ──────────────────────────────────────────────────────

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    for &n in &[252usize, 1260] {
        let candles = make_candles(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &candles, |b, candles| {
            b.iter(|| analyze("BENCH", black_box(candles)))
        });
    }
    group.finish();
}

// ── 3. Scoring ───────────────────────────────────────────────────────

fn bench_score(c: &mut Criterion) {
    let candles = make_candles(252);
    let analysis = analyze("BENCH", &candles);
    let mut quote = Quote::bare("BENCH", candles[candles.len() - 1].close);
    quote.fifty_two_week_low = Some(85.0);
    quote.target_mean_price = Some(120.0);

    c.bench_function("score_opportunity", |b| {
        b.iter(|| score_opportunity(black_box(&quote), black_box(&analysis)))
    });
}

criterion_group!(benches, bench_indicators, bench_analyze, bench_score);
criterion_main!(benches);
