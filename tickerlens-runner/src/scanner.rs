//! Scanner — fetches, analyzes and scores every ticker in a universe.
//!
//! Tickers are independent: each runs as its own rayon task, and a provider
//! failure for one ticker is recorded in the report without touching the
//! others. A provider that panics on one ticker fails that ticker only.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use tickerlens_core::data::{ChartRange, DataError, DataSource, MarketDataProvider};
use tickerlens_core::domain::Ticker;
use tickerlens_core::scoring::HOT_SCORE;
use tickerlens_core::{analyze, score_opportunity, Opportunity};

use crate::config::ConfigError;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that abort a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("nothing to scan: the ticker universe is empty")]
    EmptyUniverse,
    #[error("data provider '{0}' is unavailable")]
    ProviderUnavailable(String),
}

/// Result of scanning one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Scored(Opportunity),
    /// Not an error: the ticker has no usable history.
    Skipped { ticker: Ticker, reason: String },
    Failed { ticker: Ticker, error: String },
}

/// A ticker left out of the ranking, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerIssue {
    pub ticker: Ticker,
    pub reason: String,
}

/// Ranked outcome of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub scanned_at: DateTime<Utc>,
    pub range: ChartRange,
    pub provider: String,
    pub source: DataSource,
    pub config_hash: Option<String>,
    pub hot_threshold: f64,
    /// Sorted by score, highest first.
    pub opportunities: Vec<Opportunity>,
    pub skipped: Vec<TickerIssue>,
    pub failed: Vec<TickerIssue>,
    pub hot_count: usize,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScanReport {
    /// Build a report from per-ticker outcomes, ranking the scored ones.
    pub fn from_outcomes(
        outcomes: Vec<TickerOutcome>,
        range: ChartRange,
        provider: &str,
        source: DataSource,
        hot_threshold: f64,
    ) -> Self {
        let mut opportunities = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome {
                TickerOutcome::Scored(opp) => opportunities.push(opp),
                TickerOutcome::Skipped { ticker, reason } => {
                    skipped.push(TickerIssue { ticker, reason })
                }
                TickerOutcome::Failed { ticker, error } => failed.push(TickerIssue {
                    ticker,
                    reason: error,
                }),
            }
        }
        rank_opportunities(&mut opportunities);
        let hot_count = count_hot(&opportunities, hot_threshold);

        Self {
            schema_version: SCHEMA_VERSION,
            scanned_at: Utc::now(),
            range,
            provider: provider.to_string(),
            source,
            config_hash: None,
            hot_threshold,
            opportunities,
            skipped,
            failed,
            hot_count,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn hot(&self) -> impl Iterator<Item = &Opportunity> {
        self.opportunities
            .iter()
            .filter(move |o| o.score >= self.hot_threshold)
    }
}

/// Sort by score descending. Ties keep their input order.
pub fn rank_opportunities(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Number of opportunities scoring at or above `threshold`.
pub fn count_hot(opportunities: &[Opportunity], threshold: f64) -> usize {
    opportunities.iter().filter(|o| o.score >= threshold).count()
}

/// Fetch, analyze and score a single ticker.
pub fn scan_ticker(
    ticker: &str,
    provider: &dyn MarketDataProvider,
    range: ChartRange,
) -> TickerOutcome {
    let failed = |e: DataError| {
        warn!(ticker, error = %e, "ticker failed");
        TickerOutcome::Failed {
            ticker: ticker.to_string(),
            error: e.to_string(),
        }
    };

    let candles = match provider.candles(ticker, range) {
        Ok(c) => c,
        Err(e) => return failed(e),
    };
    if candles.is_empty() {
        debug!(ticker, "no candle history, skipping");
        return TickerOutcome::Skipped {
            ticker: ticker.to_string(),
            reason: "no candle history".into(),
        };
    }

    let quote = match provider.quote(ticker) {
        Ok(q) => q,
        Err(e) => return failed(e),
    };

    let analysis = analyze(ticker, &candles);
    let opp = score_opportunity(&quote, &analysis);
    debug!(ticker, score = opp.score, signals = opp.signals.len(), "ticker scored");
    TickerOutcome::Scored(opp)
}

/// [`scan_ticker`], with a panic inside the provider turned into a failure.
fn scan_ticker_isolated(
    ticker: &str,
    provider: &dyn MarketDataProvider,
    range: ChartRange,
) -> TickerOutcome {
    panic::catch_unwind(AssertUnwindSafe(|| scan_ticker(ticker, provider, range))).unwrap_or_else(
        |payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(ticker, panic = %message, "ticker panicked");
            TickerOutcome::Failed {
                ticker: ticker.to_string(),
                error: format!("provider panicked: {message}"),
            }
        },
    )
}

/// Scanner configuration: provider, history window and hot cutoff.
pub struct Scanner<'a> {
    provider: &'a dyn MarketDataProvider,
    range: ChartRange,
    hot_threshold: f64,
    parallel: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(provider: &'a dyn MarketDataProvider, range: ChartRange) -> Self {
        Self {
            provider,
            range,
            hot_threshold: HOT_SCORE,
            parallel: true,
        }
    }

    pub fn with_hot_threshold(mut self, threshold: f64) -> Self {
        self.hot_threshold = threshold;
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Scan every ticker. Outcomes come back in input order.
    pub fn scan(&self, tickers: &[Ticker]) -> Result<ScanReport, ScanError> {
        if tickers.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }
        if !self.provider.is_available() {
            return Err(ScanError::ProviderUnavailable(self.provider.name().to_string()));
        }

        info!(
            tickers = tickers.len(),
            range = %self.range,
            provider = self.provider.name(),
            "starting scan"
        );

        let outcomes: Vec<TickerOutcome> = if self.parallel {
            tickers
                .par_iter()
                .map(|t| scan_ticker_isolated(t, self.provider, self.range))
                .collect()
        } else {
            tickers
                .iter()
                .map(|t| scan_ticker_isolated(t, self.provider, self.range))
                .collect()
        };

        let report = ScanReport::from_outcomes(
            outcomes,
            self.range,
            self.provider.name(),
            self.provider.source(),
            self.hot_threshold,
        );
        info!(
            scored = report.opportunities.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            hot = report.hot_count,
            "scan complete"
        );
        Ok(report)
    }
}

/// Scan `tickers` in parallel with the default hot threshold.
pub fn scan_universe(
    tickers: &[Ticker],
    provider: &dyn MarketDataProvider,
    range: ChartRange,
) -> Result<ScanReport, ScanError> {
    Scanner::new(provider, range).scan(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlens_core::signals::{Signal, SignalFamily, SignalType};

    fn opp(ticker: &str, score: f64) -> Opportunity {
        Opportunity {
            ticker: ticker.into(),
            name: ticker.into(),
            price: 10.0,
            score,
            signals: vec![Signal::new(SignalType::Buy, SignalFamily::Rsi, "x", 10.0)],
            rsi: None,
            distance_from_sma200: None,
            distance_from_52w_low: None,
            below_analyst_target: None,
        }
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let mut opps = vec![opp("A", 55.0), opp("B", 80.0), opp("C", 55.0), opp("D", 70.0)];
        rank_opportunities(&mut opps);
        let order: Vec<&str> = opps.iter().map(|o| o.ticker.as_str()).collect();
        assert_eq!(order, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn hot_count_includes_threshold() {
        let opps = vec![opp("A", 69.99), opp("B", 70.0), opp("C", 100.0)];
        assert_eq!(count_hot(&opps, 70.0), 2);
        assert_eq!(count_hot(&opps, 50.0), 3);
    }

    #[test]
    fn report_partitions_outcomes() {
        let outcomes = vec![
            TickerOutcome::Scored(opp("A", 40.0)),
            TickerOutcome::Skipped {
                ticker: "B".into(),
                reason: "no candle history".into(),
            },
            TickerOutcome::Failed {
                ticker: "C".into(),
                error: "boom".into(),
            },
            TickerOutcome::Scored(opp("D", 90.0)),
        ];
        let report = ScanReport::from_outcomes(
            outcomes,
            ChartRange::OneYear,
            "test",
            DataSource::Synthetic,
            70.0,
        );
        assert_eq!(report.opportunities[0].ticker, "D");
        assert_eq!(report.skipped[0].ticker, "B");
        assert_eq!(report.failed[0].reason, "boom");
        assert_eq!(report.hot_count, 1);
        assert_eq!(report.hot().count(), 1);
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.source, DataSource::Synthetic);
    }
}
