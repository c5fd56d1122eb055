//! Candle ingest: the boundary filter between provider payloads and the engine.
//!
//! Drops records missing any of open/high/low/close or carrying non-positive
//! prices, defaults a missing volume to zero, sorts by date and keeps the last
//! record for a repeated date.

use super::provider::RawCandle;
use crate::domain::Candle;

/// Result of ingesting a raw candle batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub candles: Vec<Candle>,
    /// Records discarded as incomplete, non-positive or superseded duplicates.
    pub dropped: usize,
}

pub fn ingest_candles(raw: Vec<RawCandle>) -> IngestReport {
    let total = raw.len();

    let mut candles: Vec<Candle> = raw.into_iter().filter_map(complete_candle).collect();

    // Stable sort keeps arrival order for equal dates; later duplicates win.
    candles.sort_by_key(|c| c.date);
    let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match deduped.last_mut() {
            Some(last) if last.date == candle.date => *last = candle,
            _ => deduped.push(candle),
        }
    }

    IngestReport {
        dropped: total - deduped.len(),
        candles: deduped,
    }
}

fn complete_candle(raw: RawCandle) -> Option<Candle> {
    let candle = Candle {
        date: raw.date,
        open: raw.open?,
        high: raw.high?,
        low: raw.low?,
        close: raw.close?,
        volume: raw.volume.unwrap_or(0),
    };
    [candle.open, candle.high, candle.low, candle.close]
        .iter()
        .all(|p| p.is_finite() && *p > 0.0)
        .then_some(candle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(day: u32, close: Option<f64>) -> RawCandle {
        RawCandle {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: Some(10.0),
            high: Some(12.0),
            low: Some(9.0),
            close,
            volume: Some(100),
        }
    }

    #[test]
    fn drops_incomplete_records() {
        let report = ingest_candles(vec![raw(2, Some(11.0)), raw(3, None), raw(4, Some(11.5))]);
        assert_eq!(report.candles.len(), 2);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn drops_non_positive_prices() {
        let report = ingest_candles(vec![raw(2, Some(0.0)), raw(3, Some(-1.0))]);
        assert!(report.candles.is_empty());
        assert_eq!(report.dropped, 2);
    }

    #[test]
    fn missing_volume_becomes_zero() {
        let mut r = raw(2, Some(11.0));
        r.volume = None;
        let report = ingest_candles(vec![r]);
        assert_eq!(report.candles[0].volume, 0);
    }

    #[test]
    fn sorts_and_dedupes_keeping_last() {
        let report = ingest_candles(vec![
            raw(5, Some(11.0)),
            raw(3, Some(10.5)),
            raw(5, Some(11.8)),
        ]);
        let dates: Vec<u32> = report
            .candles
            .iter()
            .map(|c| chrono::Datelike::day(&c.date))
            .collect();
        assert_eq!(dates, vec![3, 5]);
        assert_eq!(report.candles[1].close, 11.8);
        assert_eq!(report.dropped, 1);
    }
}
