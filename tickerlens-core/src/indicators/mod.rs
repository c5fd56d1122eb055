//! Indicator Engine — pure functions from a closing-price series to values.
//!
//! Every indicator computes its full rolling series internally (same length as
//! the input, `f64::NAN` during warmup) and consumers read the latest element
//! through [`Indicator::latest`], which turns warmup and short histories into
//! `None`.
//!
//! Multi-series indicators (MACD, Bollinger) expose one named instance per
//! component line, plus a helper returning all components together.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger_bands, Bollinger, BollingerBand, BollingerBands};
pub use ema::{ema_of_series, Ema};
pub use macd::{macd, Macd, MacdLine, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;

/// Trait for single-series indicators.
///
/// # Look-ahead guard
/// The value at index t may depend only on `closes[0..=t]`. Truncating the
/// input must never change an already-computed earlier value.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading warmup values (`f64::NAN`) in the output series.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the entire series.
    ///
    /// Returns a `Vec<f64>` of the same length as `closes`.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;

    /// Minimum input length that yields at least one value.
    fn min_len(&self) -> usize {
        self.lookback() + 1
    }

    /// Most recent value, or `None` when the history is too short.
    fn latest(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.min_len() {
            return None;
        }
        self.compute(closes)
            .last()
            .copied()
            .filter(|v| v.is_finite())
    }
}

/// Create synthetic candles from close prices for testing.
///
/// open = previous close (or close for the first candle),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_is_none_below_min_len() {
        let sma = Sma::new(3);
        assert_eq!(sma.latest(&[1.0, 2.0]), None);
        assert_eq!(sma.latest(&[]), None);
    }

    #[test]
    fn latest_picks_last_element() {
        let sma = Sma::new(2);
        assert_approx(sma.latest(&[1.0, 2.0, 3.0, 5.0]).unwrap(), 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn truncation_does_not_change_earlier_values() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(20)),
            Box::new(Ema::new(12)),
            Box::new(Rsi::new(14)),
            Box::new(Macd::new(12, 26, 9, MacdLine::Signal)),
            Box::new(Bollinger::lower(20, 2.0)),
        ];
        for ind in &indicators {
            let full = ind.compute(&closes);
            let truncated = ind.compute(&closes[..45]);
            for i in 0..45 {
                if truncated[i].is_nan() {
                    assert!(full[i].is_nan(), "{} diverged at {i}", ind.name());
                } else {
                    assert_approx(full[i], truncated[i], DEFAULT_EPSILON);
                }
            }
        }
    }
}
