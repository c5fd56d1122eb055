//! Signal Generator — turns the latest indicator values into directional signals.
//!
//! Each indicator family is a [`SignalRule`]. A rule sees only the current
//! price and the indicator snapshot, and contributes at most one signal.
//! Rules are evaluated in a fixed order so identical inputs always produce an
//! identical signal list.

pub mod bollinger;
pub mod ma_cross;
pub mod macd;
pub mod rsi;
pub mod sma200;

pub use bollinger::BollingerRule;
pub use ma_cross::MaCrossRule;
pub use macd::MacdRule;
pub use rsi::RsiRule;
pub use sma200::Sma200DistanceRule;

use crate::analysis::IndicatorSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
    Neutral,
}

/// Indicator family a signal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalFamily {
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "SMA200")]
    Sma200,
    #[serde(rename = "MA Cross")]
    MaCross,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "Bollinger")]
    Bollinger,
}

impl SignalFamily {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Sma200 => "SMA200",
            Self::MaCross => "MA Cross",
            Self::Macd => "MACD",
            Self::Bollinger => "Bollinger",
        }
    }
}

impl fmt::Display for SignalFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A directional signal with a 0..=100 strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub indicator: SignalFamily,
    pub message: String,
    pub strength: f64,
}

impl Signal {
    pub fn new(
        signal_type: SignalType,
        indicator: SignalFamily,
        message: impl Into<String>,
        strength: f64,
    ) -> Self {
        Self {
            signal_type,
            indicator,
            message: message.into(),
            strength,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.signal_type != SignalType::Neutral
    }
}

/// One indicator family's rule.
///
/// Rules never see portfolio or quote fundamentals; only price and indicators.
pub trait SignalRule: Send + Sync {
    fn family(&self) -> SignalFamily;

    /// Evaluate the rule. `None` when the inputs are missing or no threshold is crossed.
    fn evaluate(&self, price: f64, snapshot: &IndicatorSnapshot) -> Option<Signal>;
}

/// The five standard rules, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn SignalRule>> {
    vec![
        Box::new(RsiRule::default()),
        Box::new(Sma200DistanceRule::default()),
        Box::new(MaCrossRule::default()),
        Box::new(MacdRule::default()),
        Box::new(BollingerRule::default()),
    ]
}

/// Run a rule set against a price and snapshot.
pub fn evaluate_rules(
    rules: &[Box<dyn SignalRule>],
    price: f64,
    snapshot: &IndicatorSnapshot,
) -> Vec<Signal> {
    rules
        .iter()
        .filter_map(|rule| rule.evaluate(price, snapshot))
        .collect()
}

/// Generate signals with the standard rule set.
pub fn generate_signals(price: f64, snapshot: &IndicatorSnapshot) -> Vec<Signal> {
    evaluate_rules(&default_rules(), price, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{BollingerBands, MacdValue};
    use std::collections::HashSet;

    fn full_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi14: Some(25.0),
            sma20: Some(95.0),
            sma50: Some(110.0),
            sma200: Some(100.0),
            ema12: Some(94.0),
            ema26: Some(96.0),
            macd: Some(MacdValue {
                macd: 1.0,
                signal: 0.5,
                histogram: 0.5,
            }),
            bollinger_bands: Some(BollingerBands {
                upper: 110.0,
                middle: 100.0,
                lower: 92.0,
            }),
        }
    }

    #[test]
    fn rules_run_in_family_order() {
        let families: Vec<SignalFamily> = default_rules().iter().map(|r| r.family()).collect();
        assert_eq!(
            families,
            vec![
                SignalFamily::Rsi,
                SignalFamily::Sma200,
                SignalFamily::MaCross,
                SignalFamily::Macd,
                SignalFamily::Bollinger,
            ]
        );
    }

    #[test]
    fn at_most_one_signal_per_family() {
        let signals = generate_signals(90.0, &full_snapshot());
        assert_eq!(signals.len(), 5);
        let families: HashSet<SignalFamily> = signals.iter().map(|s| s.indicator).collect();
        assert_eq!(families.len(), 5);
    }

    #[test]
    fn empty_snapshot_produces_no_signals() {
        assert!(generate_signals(100.0, &IndicatorSnapshot::default()).is_empty());
    }

    #[test]
    fn generation_is_idempotent() {
        let snap = full_snapshot();
        assert_eq!(generate_signals(90.0, &snap), generate_signals(90.0, &snap));
    }

    #[test]
    fn signal_serialization_shape() {
        let signal = Signal::new(SignalType::Buy, SignalFamily::MaCross, "Golden cross", 40.0);
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["type"], "buy");
        assert_eq!(json["indicator"], "MA Cross");
        assert_eq!(json["strength"], 40.0);
        let back: Signal = serde_json::from_value(json).unwrap();
        assert_eq!(back, signal);
    }
}
