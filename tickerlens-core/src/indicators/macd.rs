//! Moving Average Convergence Divergence (MACD).
//!
//! - MACD line = EMA(fast) - EMA(slow)
//! - Signal line = EMA(signal) of the MACD line, seeded once the MACD line exists
//! - Histogram = MACD line - signal line
//!
//! The MACD line is valid from index slow-1; the signal line and histogram
//! from index slow+signal-2. Lookback is that of the requested line.

use super::ema::ema_of_series;
use super::Indicator;
use serde::{Deserialize, Serialize};

/// Which MACD line to expose as a single series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

/// All three MACD components at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        let label = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "histogram",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// First index at which the MACD line exists.
    fn macd_start(&self) -> usize {
        self.fast.max(self.slow) - 1
    }

    /// Full MACD-line and signal-line series (NaN during warmup).
    fn lines(&self, closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = closes.len();
        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);

        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let mut signal_line = vec![f64::NAN; n];
        let start = self.macd_start();
        if n > start {
            let signal_tail = ema_of_series(&macd_line[start..], self.signal);
            signal_line[start..].copy_from_slice(&signal_tail);
        }

        (macd_line, signal_line)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.macd_start(),
            MacdLine::Signal | MacdLine::Histogram => self.macd_start() + self.signal - 1,
        }
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let (macd_line, signal_line) = self.lines(closes);
        match self.line {
            MacdLine::Macd => macd_line,
            MacdLine::Signal => signal_line,
            MacdLine::Histogram => macd_line
                .iter()
                .zip(&signal_line)
                .map(|(m, s)| m - s)
                .collect(),
        }
    }
}

/// Latest MACD components, all present or `None`.
///
/// Requires enough history for the fast EMA, the slow EMA and the signal EMA
/// of the MACD line at the final period: `slow + signal - 1` closes.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdValue> {
    let indicator = Macd::new(fast, slow, signal, MacdLine::Signal);
    if closes.len() < indicator.min_len() {
        return None;
    }
    let (macd_line, signal_line) = indicator.lines(closes);
    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;
    if !macd.is_finite() || !signal.is_finite() {
        return None;
    }
    Some(MacdValue {
        macd,
        signal,
        histogram: macd - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn macd_requires_34_closes_for_12_26_9() {
        assert!(macd(&wave(33), 12, 26, 9).is_none());
        assert!(macd(&wave(34), 12, 26, 9).is_some());
    }

    #[test]
    fn macd_line_lookback() {
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Macd).lookback(), 25);
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Signal).lookback(), 33);
        assert_eq!(Macd::new(12, 26, 9, MacdLine::Histogram).lookback(), 33);
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let value = macd(&wave(120), 12, 26, 9).unwrap();
        assert_eq!(value.histogram, value.macd - value.signal);
    }

    #[test]
    fn macd_line_equals_ema_difference() {
        let closes = wave(60);
        let value = macd(&closes, 12, 26, 9).unwrap();
        let fast = ema_of_series(&closes, 12);
        let slow = ema_of_series(&closes, 26);
        assert_approx(value.macd, fast[59] - slow[59], DEFAULT_EPSILON);
    }

    #[test]
    fn signal_seeded_with_mean_of_first_macd_values() {
        // period 3/5/2: MACD line valid from index 4, signal seed at index 5
        let closes = [1.0, 2.0, 4.0, 7.0, 11.0, 16.0];
        let ind = Macd::new(3, 5, 2, MacdLine::Signal);
        let (macd_line, signal_line) = ind.lines(&closes);
        assert!(signal_line[4].is_nan());
        assert_approx(signal_line[5], (macd_line[4] + macd_line[5]) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_series_has_zero_macd() {
        let value = macd(&[50.0; 40], 12, 26, 9).unwrap();
        assert_approx(value.macd, 0.0, DEFAULT_EPSILON);
        assert_approx(value.histogram, 0.0, DEFAULT_EPSILON);
    }
}
