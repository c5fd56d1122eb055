//! Synthetic market data for offline runs and tests.
//!
//! Each ticker gets one deterministic daily random walk covering the longest
//! chart range. Candles for shorter ranges are slices of that path, weekly
//! ranges are resampled from it, and quotes read its last bar, so every view
//! of a ticker agrees. Reports record `DataSource::Synthetic`.

use super::provider::{ChartRange, DataError, DataSource, Interval, MarketDataProvider};
use crate::domain::{Candle, Quote};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Trading days in the 52-week window used for the derived quote.
const FIFTY_TWO_WEEK_BARS: usize = 252;

/// Longest history any range can ask for.
const PATH_RANGE: ChartRange = ChartRange::FiveYears;

/// Offline provider generating seeded random-walk candles.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    as_of: Option<NaiveDate>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the series end date instead of using today's date.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    fn rng_for(ticker: &str) -> StdRng {
        // Deterministic seed from ticker name
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        StdRng::from_seed(seed)
    }

    /// Daily weekday candles for `ticker` between `start` and `end` inclusive.
    pub fn generate(ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<Candle> {
        let mut rng = Self::rng_for(ticker);
        let mut price: f64 = rng.gen_range(20.0..400.0);

        let mut candles = Vec::new();
        let mut current = start;
        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let ret: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            candles.push(Candle {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        candles
    }

    /// The full daily path ending at `today`.
    fn daily_path(ticker: &str, today: NaiveDate) -> Vec<Candle> {
        Self::generate(ticker, PATH_RANGE.start_date(today), today)
    }

    /// Derive a quote from a daily candle history.
    fn quote_from(ticker: &str, candles: &[Candle]) -> Option<Quote> {
        let last = candles.last()?;
        let prev = candles.len().checked_sub(2).map(|i| candles[i].close);
        let window = &candles[candles.len().saturating_sub(FIFTY_TWO_WEEK_BARS)..];

        let mut quote = Quote::bare(ticker, last.close);
        quote.previous_close = prev;
        quote.change = prev.map(|p| last.close - p);
        quote.change_percent = prev.map(|p| (last.close - p) / p * 100.0);
        quote.day_high = Some(last.high);
        quote.day_low = Some(last.low);
        quote.volume = Some(last.volume);
        quote.fifty_two_week_high = window.iter().map(|c| c.high).reduce(f64::max);
        quote.fifty_two_week_low = window.iter().map(|c| c.low).reduce(f64::min);
        Some(quote)
    }
}

/// Aggregate daily candles into one bar per calendar week.
///
/// Each bar is dated at its first trading day, which is the Monday except
/// for a partial first week.
pub fn resample_weekly(daily: &[Candle]) -> Vec<Candle> {
    let week_of =
        |d: NaiveDate| d - chrono::Duration::days(i64::from(d.weekday().num_days_from_monday()));

    let mut weekly: Vec<Candle> = Vec::new();
    let mut current_week = None;
    for c in daily {
        let week = week_of(c.date);
        match weekly.last_mut() {
            Some(bar) if current_week == Some(week) => {
                bar.high = bar.high.max(c.high);
                bar.low = bar.low.min(c.low);
                bar.close = c.close;
                bar.volume += c.volume;
            }
            _ => {
                weekly.push(c.clone());
                current_week = Some(week);
            }
        }
    }
    weekly
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn quote(&self, ticker: &str) -> Result<Quote, DataError> {
        let path = Self::daily_path(ticker, self.today());
        Self::quote_from(ticker, &path).ok_or_else(|| DataError::MissingPrice {
            ticker: ticker.to_string(),
        })
    }

    fn candles(&self, ticker: &str, range: ChartRange) -> Result<Vec<Candle>, DataError> {
        let today = self.today();
        let start = range.start_date(today);
        let path = Self::daily_path(ticker, today);
        let from = path.partition_point(|c| c.date < start);
        let daily = &path[from..];
        Ok(match range.interval() {
            Interval::Daily => daily.to_vec(),
            Interval::Weekly => resample_weekly(daily),
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
