//! Scan configuration loaded from TOML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tickerlens_core::data::ChartRange;
use tickerlens_core::domain::{canonical_ticker, Ticker};
use tickerlens_core::portfolio::{
    Dividend, Holding, HoldingWithQuote, PortfolioSummary, Transaction,
};
use tickerlens_core::scoring::HOT_SCORE;

/// Errors loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown range '{0}' (expected 1mo, 3mo, 6mo, 1y, 2y or 5y)")]
    UnknownRange(String),
    #[error("hot_threshold must be within 0..=100, got {0}")]
    HotThreshold(f64),
    #[error("transaction for {ticker} has non-positive shares")]
    InvalidShares { ticker: String },
    #[error("dividend for {ticker} has a negative amount")]
    NegativeDividend { ticker: String },
}

/// Everything a scan needs besides the data provider.
///
/// ```toml
/// watchlist = ["NVDA", "amd"]
/// range = "1y"
/// hot_threshold = 70
///
/// [[transactions]]
/// ticker = "VOO"
/// date = "2024-03-01"
/// cost_usd = 1000.0
/// shares = 2.1
/// price_per_share = 476.19
/// sector = "Index"
///
/// [[dividends]]
/// ticker = "VOO"
/// date = "2024-06-28"
/// amount = 3.12
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub watchlist: Vec<String>,
    pub range: String,
    pub hot_threshold: f64,
    pub transactions: Vec<Transaction>,
    pub dividends: Vec<Dividend>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            range: ChartRange::OneYear.code().to_string(),
            hot_threshold: HOT_SCORE,
            transactions: Vec::new(),
            dividends: Vec::new(),
        }
    }
}

impl ScanConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chart_range()?;
        if !(0.0..=100.0).contains(&self.hot_threshold) {
            return Err(ConfigError::HotThreshold(self.hot_threshold));
        }
        if let Some(tx) = self.transactions.iter().find(|t| t.shares <= 0.0) {
            return Err(ConfigError::InvalidShares {
                ticker: tx.ticker.clone(),
            });
        }
        if let Some(d) = self.dividends.iter().find(|d| d.amount < 0.0) {
            return Err(ConfigError::NegativeDividend {
                ticker: d.ticker.clone(),
            });
        }
        Ok(())
    }

    pub fn chart_range(&self) -> Result<ChartRange, ConfigError> {
        ChartRange::parse(&self.range).ok_or_else(|| ConfigError::UnknownRange(self.range.clone()))
    }

    pub fn holdings(&self) -> Vec<Holding> {
        Holding::from_transactions(&self.transactions)
    }

    /// Totals for the configured holdings, given the subset that was quoted.
    pub fn portfolio_summary(&self, enriched: &[HoldingWithQuote]) -> PortfolioSummary {
        PortfolioSummary::build(&self.holdings(), enriched, &self.dividends)
    }

    /// Held tickers followed by the watchlist: upper-cased, de-duplicated,
    /// first-seen order.
    pub fn universe(&self) -> Vec<Ticker> {
        let held = self.transactions.iter().map(|t| t.ticker.as_str());
        let watched = self.watchlist.iter().map(String::as_str);
        dedup_tickers(held.chain(watched))
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    pub fn config_hash(&self) -> String {
        // Field order is fixed, so the JSON is canonical.
        let json = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Canonicalize and de-duplicate tickers, keeping first-seen order. Blank
/// entries are dropped.
pub fn dedup_tickers<'a>(tickers: impl IntoIterator<Item = &'a str>) -> Vec<Ticker> {
    let mut seen = HashSet::new();
    tickers
        .into_iter()
        .map(canonical_ticker)
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
