//! Price distance from the 200-period SMA.
//!
//! More than 5% below → buy, more than 15% above → sell. The band in between
//! emits nothing (not even a neutral signal).

use super::{Signal, SignalFamily, SignalRule, SignalType};
use crate::analysis::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct Sma200DistanceRule {
    /// Percent below the SMA that triggers a buy (negative).
    pub buy_below_pct: f64,
    /// Percent above the SMA that triggers a sell.
    pub sell_above_pct: f64,
}

impl Default for Sma200DistanceRule {
    fn default() -> Self {
        Self {
            buy_below_pct: -5.0,
            sell_above_pct: 15.0,
        }
    }
}

/// Percent distance of `price` from `reference`.
pub fn percent_distance(price: f64, reference: f64) -> f64 {
    (price - reference) / reference * 100.0
}

impl SignalRule for Sma200DistanceRule {
    fn family(&self) -> SignalFamily {
        SignalFamily::Sma200
    }

    fn evaluate(&self, price: f64, snapshot: &IndicatorSnapshot) -> Option<Signal> {
        let sma200 = snapshot.sma200?;
        let dist = percent_distance(price, sma200);
        if dist < self.buy_below_pct {
            Some(Signal::new(
                SignalType::Buy,
                SignalFamily::Sma200,
                format!("{:.1}% below SMA(200)", dist.abs()),
                (dist.abs() * 3.0).min(100.0),
            ))
        } else if dist > self.sell_above_pct {
            Some(Signal::new(
                SignalType::Sell,
                SignalFamily::Sma200,
                format!("{dist:.1}% above SMA(200)"),
                (dist * 2.0).min(100.0),
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    fn with_sma200(sma200: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            sma200: Some(sma200),
            ..Default::default()
        }
    }

    #[test]
    fn ten_percent_below_is_buy() {
        let s = Sma200DistanceRule::default()
            .evaluate(90.0, &with_sma200(100.0))
            .unwrap();
        assert_eq!(s.signal_type, SignalType::Buy);
        assert_approx(s.strength, 30.0, 1e-9);
        assert_eq!(s.message, "10.0% below SMA(200)");
    }

    #[test]
    fn twenty_percent_above_is_sell() {
        let s = Sma200DistanceRule::default()
            .evaluate(120.0, &with_sma200(100.0))
            .unwrap();
        assert_eq!(s.signal_type, SignalType::Sell);
        assert_approx(s.strength, 40.0, 1e-9);
    }

    #[test]
    fn strength_caps_at_100() {
        let s = Sma200DistanceRule::default()
            .evaluate(200.0, &with_sma200(100.0))
            .unwrap();
        assert_eq!(s.strength, 100.0);
    }

    #[test]
    fn inside_band_emits_nothing() {
        let rule = Sma200DistanceRule::default();
        for price in [96.0, 100.0, 110.0, 114.0] {
            assert!(rule.evaluate(price, &with_sma200(100.0)).is_none(), "price={price}");
        }
    }

    #[test]
    fn missing_sma200_emits_nothing() {
        assert!(Sma200DistanceRule::default()
            .evaluate(50.0, &IndicatorSnapshot::default())
            .is_none());
    }
}
