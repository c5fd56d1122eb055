//! MACD rule: bullish when histogram and line/signal agree upward, bearish when
//! they agree downward. Mixed states emit nothing.

use super::{Signal, SignalFamily, SignalRule, SignalType};
use crate::analysis::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct MacdRule {
    pub strength: f64,
}

impl Default for MacdRule {
    fn default() -> Self {
        Self { strength: 50.0 }
    }
}

impl SignalRule for MacdRule {
    fn family(&self) -> SignalFamily {
        SignalFamily::Macd
    }

    fn evaluate(&self, _price: f64, snapshot: &IndicatorSnapshot) -> Option<Signal> {
        let m = snapshot.macd?;
        if m.histogram > 0.0 && m.macd > m.signal {
            Some(Signal::new(
                SignalType::Buy,
                SignalFamily::Macd,
                "MACD bullish crossover",
                self.strength,
            ))
        } else if m.histogram < 0.0 && m.macd < m.signal {
            Some(Signal::new(
                SignalType::Sell,
                SignalFamily::Macd,
                "MACD bearish crossover",
                self.strength,
            ))
        } else {
            None
        }
    }
}
