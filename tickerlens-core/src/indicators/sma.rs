//! Simple Moving Average (SMA).
//!
//! Rolling mean of closes over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let mut sum: f64 = closes[..self.period].iter().sum();
        result[self.period - 1] = sum / self.period as f64;

        // Roll the window forward
        for i in self.period..n {
            sum += closes[i] - closes[i - self.period];
            result[i] = sum / self.period as f64;
        }

        result
    }

    fn latest(&self, closes: &[f64]) -> Option<f64> {
        // Direct mean of the trailing window; avoids rolling-sum drift on long series.
        if closes.len() < self.period {
            return None;
        }
        let window = &closes[closes.len() - self.period..];
        let mean = window.iter().sum::<f64>() / self.period as f64;
        mean.is_finite().then_some(mean)
    }
}
