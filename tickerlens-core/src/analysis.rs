//! Technical analysis: candle history in, indicator snapshot and signals out.
//!
//! The snapshot holds only the latest value of each rolling series. Any field
//! whose lookback exceeds the supplied history is `None`.

use crate::domain::{closes, Candle};
use crate::indicators::{bollinger_bands, macd, BollingerBands, Ema, Indicator, MacdValue, Rsi, Sma};
use crate::signals::{generate_signals, Signal};
use serde::{Deserialize, Serialize};

pub const RSI_PERIOD: usize = 14;
pub const SMA_SHORT: usize = 20;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;
pub const EMA_FAST: usize = 12;
pub const EMA_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STDDEV: f64 = 2.0;

/// Latest indicator values for one closing-price series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi14: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub macd: Option<MacdValue>,
    pub bollinger_bands: Option<BollingerBands>,
}

impl IndicatorSnapshot {
    /// Compute every indicator from a closing-price series.
    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            rsi14: Rsi::new(RSI_PERIOD).latest(closes),
            sma20: Sma::new(SMA_SHORT).latest(closes),
            sma50: Sma::new(SMA_MEDIUM).latest(closes),
            sma200: Sma::new(SMA_LONG).latest(closes),
            ema12: Ema::new(EMA_FAST).latest(closes),
            ema26: Ema::new(EMA_SLOW).latest(closes),
            macd: macd(closes, EMA_FAST, EMA_SLOW, MACD_SIGNAL),
            bollinger_bands: bollinger_bands(closes, BOLLINGER_PERIOD, BOLLINGER_STDDEV),
        }
    }

    /// True when no indicator had enough history.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Snapshot plus signals for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub ticker: String,
    #[serde(flatten)]
    pub snapshot: IndicatorSnapshot,
    pub signals: Vec<Signal>,
}

/// Analyze a ticker's candle history.
///
/// Signals are evaluated against the last close. An empty history yields an
/// all-`None` snapshot and no signals.
pub fn analyze(ticker: &str, candles: &[Candle]) -> TechnicalAnalysis {
    let closes = closes(candles);
    let snapshot = IndicatorSnapshot::from_closes(&closes);
    let signals = match closes.last() {
        Some(&price) => generate_signals(price, &snapshot),
        None => Vec::new(),
    };
    TechnicalAnalysis {
        ticker: ticker.to_string(),
        snapshot,
        signals,
    }
}
