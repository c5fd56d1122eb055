//! RSI rule: oversold below 30, overbought above 70, neutral otherwise.

use super::{Signal, SignalFamily, SignalRule, SignalType};
use crate::analysis::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct RsiRule {
    pub oversold: f64,
    pub overbought: f64,
    /// Strength gained per RSI point beyond the threshold.
    pub strength_per_point: f64,
}

impl Default for RsiRule {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
            strength_per_point: 5.0,
        }
    }
}

impl SignalRule for RsiRule {
    fn family(&self) -> SignalFamily {
        SignalFamily::Rsi
    }

    fn evaluate(&self, _price: f64, snapshot: &IndicatorSnapshot) -> Option<Signal> {
        let rsi = snapshot.rsi14?;
        let signal = if rsi < self.oversold {
            Signal::new(
                SignalType::Buy,
                SignalFamily::Rsi,
                format!("RSI oversold at {rsi:.1}"),
                ((self.oversold - rsi) * self.strength_per_point).min(100.0),
            )
        } else if rsi > self.overbought {
            Signal::new(
                SignalType::Sell,
                SignalFamily::Rsi,
                format!("RSI overbought at {rsi:.1}"),
                ((rsi - self.overbought) * self.strength_per_point).min(100.0),
            )
        } else {
            Signal::new(
                SignalType::Neutral,
                SignalFamily::Rsi,
                format!("RSI neutral at {rsi:.1}"),
                0.0,
            )
        };
        Some(signal)
    }
}
