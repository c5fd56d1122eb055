//! Integration tests for the scan pipeline.
//!
//! A scripted provider stands in for the network: some tickers have history,
//! one has none, one always errors and one panics. The scan must score the
//! good ones and record the others without aborting.

use std::collections::HashMap;

use chrono::NaiveDate;
use tickerlens_core::data::{
    ChartRange, DataError, DataSource, MarketDataProvider, SyntheticProvider,
};
use tickerlens_core::domain::{Candle, Quote};
use tickerlens_runner::{
    load_report, save_report, scan_universe, ScanConfig, ScanError, Scanner,
};

struct ScriptedProvider {
    closes: HashMap<String, Vec<f64>>,
    quotes: HashMap<String, Quote>,
    available: bool,
}

impl ScriptedProvider {
    fn new() -> Self {
        let falling: Vec<f64> = (0..260).map(|i| 200.0 - i as f64 * 0.5).collect();
        let rising: Vec<f64> = (0..260).map(|i| 50.0 + i as f64 * 0.5).collect();

        let mut cheap = Quote::bare("CHEAP", 70.5);
        cheap.fifty_two_week_low = Some(68.0);
        cheap.target_mean_price = Some(120.0);
        let rich = Quote::bare("RICH", 179.5);

        Self {
            closes: [
                ("CHEAP".to_string(), falling),
                ("RICH".to_string(), rising),
                ("EMPTY".to_string(), Vec::new()),
            ]
            .into_iter()
            .collect(),
            quotes: [
                ("CHEAP".to_string(), cheap),
                ("RICH".to_string(), rich),
                ("EMPTY".to_string(), Quote::bare("EMPTY", 1.0)),
            ]
            .into_iter()
            .collect(),
            available: true,
        }
    }

    fn offline() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }
}

impl MarketDataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn quote(&self, ticker: &str) -> Result<Quote, DataError> {
        self.quotes
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                ticker: ticker.to_string(),
            })
    }

    fn candles(&self, ticker: &str, _range: ChartRange) -> Result<Vec<Candle>, DataError> {
        match ticker {
            "BROKEN" => return Err(DataError::NetworkUnreachable("connection reset".into())),
            "PANIC" => panic!("malformed payload for {ticker}"),
            _ => {}
        }
        let closes = self.closes.get(ticker).ok_or_else(|| DataError::SymbolNotFound {
            ticker: ticker.to_string(),
        })?;
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                date: base + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000,
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[test]
fn scan_isolates_failures_and_ranks() {
    let provider = ScriptedProvider::new();
    let report = scan_universe(
        &tickers(&["RICH", "BROKEN", "CHEAP", "EMPTY"]),
        &provider,
        ChartRange::OneYear,
    )
    .unwrap();

    let ranked: Vec<&str> = report.opportunities.iter().map(|o| o.ticker.as_str()).collect();
    assert_eq!(ranked, vec!["CHEAP", "RICH"]);
    assert!(report.opportunities[0].score > report.opportunities[1].score);

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].ticker, "EMPTY");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].ticker, "BROKEN");
    assert!(report.failed[0].reason.contains("connection reset"));
    assert_eq!(report.provider, "scripted");
    assert_eq!(report.source, DataSource::Synthetic);
}

#[test]
fn panicking_provider_fails_only_that_ticker() {
    let provider = ScriptedProvider::new();
    for parallel in [true, false] {
        let report = Scanner::new(&provider, ChartRange::OneYear)
            .with_parallelism(parallel)
            .scan(&tickers(&["RICH", "PANIC", "CHEAP"]))
            .unwrap();
        assert_eq!(report.opportunities.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].ticker, "PANIC");
        assert!(report.failed[0].reason.contains("malformed payload for PANIC"));
    }
}

#[test]
fn unavailable_provider_aborts_scan() {
    let provider = ScriptedProvider::offline();
    let err = scan_universe(&tickers(&["RICH"]), &provider, ChartRange::OneYear).unwrap_err();
    assert!(matches!(err, ScanError::ProviderUnavailable(ref name) if name == "scripted"));
}

#[test]
fn falling_stock_scores_hot() {
    let provider = ScriptedProvider::new();
    let report = scan_universe(&tickers(&["CHEAP"]), &provider, ChartRange::OneYear).unwrap();
    let cheap = &report.opportunities[0];

    // Steady decline: RSI pinned at 0, far below SMA(200), near the 52w low,
    // big upside to target.
    assert_eq!(cheap.rsi, Some(0.0));
    assert!(cheap.distance_from_sma200.unwrap() < -10.0);
    assert_eq!(cheap.score, 100.0);
    assert_eq!(report.hot_count, 1);
}

#[test]
fn sequential_and_parallel_agree() {
    let provider = ScriptedProvider::new();
    let universe = tickers(&["RICH", "CHEAP", "EMPTY", "BROKEN"]);
    let par = Scanner::new(&provider, ChartRange::OneYear).scan(&universe).unwrap();
    let seq = Scanner::new(&provider, ChartRange::OneYear)
        .with_parallelism(false)
        .scan(&universe)
        .unwrap();
    assert_eq!(par.opportunities, seq.opportunities);
    assert_eq!(par.skipped, seq.skipped);
    assert_eq!(par.failed, seq.failed);
}

#[test]
fn empty_universe_is_an_error() {
    let provider = ScriptedProvider::new();
    assert!(matches!(
        scan_universe(&[], &provider, ChartRange::OneYear),
        Err(ScanError::EmptyUniverse)
    ));
}

#[test]
fn custom_threshold_changes_hot_count() {
    let provider = ScriptedProvider::new();
    let report = Scanner::new(&provider, ChartRange::OneYear)
        .with_hot_threshold(0.0)
        .scan(&tickers(&["RICH", "CHEAP"]))
        .unwrap();
    assert_eq!(report.hot_count, 2);
}

#[test]
fn config_driven_synthetic_scan_saves_artifacts() {
    let config = ScanConfig::from_toml(
        r#"
watchlist = ["msft", "NVDA"]
range = "1y"

[[transactions]]
ticker = "voo"
date = "2024-03-01"
cost_usd = 1000.0
shares = 2.0
price_per_share = 500.0
"#,
    )
    .unwrap();

    let provider = SyntheticProvider::new().as_of(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    let report = Scanner::new(&provider, config.chart_range().unwrap())
        .with_hot_threshold(config.hot_threshold)
        .scan(&config.universe())
        .unwrap()
        .with_config_hash(config.config_hash());
    assert_eq!(report.opportunities.len(), 3);
    assert!(report.failed.is_empty());
    assert_eq!(report.source, DataSource::Synthetic);

    let dir = tempfile::tempdir().unwrap();
    let (json_path, csv_path) = save_report(&report, &dir.path().join("scan")).unwrap();
    assert!(json_path.ends_with("report.json"));

    let loaded = load_report(&json_path).unwrap();
    assert_eq!(loaded.config_hash.as_deref(), Some(config.config_hash().as_str()));
    assert_eq!(loaded.opportunities.len(), 3);

    let csv = std::fs::read_to_string(csv_path).unwrap();
    assert_eq!(csv.lines().count(), 4);
}
