//! Bollinger rule: price at or below the lower band → buy, at or above the
//! upper band → sell.

use super::{Signal, SignalFamily, SignalRule, SignalType};
use crate::analysis::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct BollingerRule {
    pub strength: f64,
}

impl Default for BollingerRule {
    fn default() -> Self {
        Self { strength: 60.0 }
    }
}

impl SignalRule for BollingerRule {
    fn family(&self) -> SignalFamily {
        SignalFamily::Bollinger
    }

    fn evaluate(&self, price: f64, snapshot: &IndicatorSnapshot) -> Option<Signal> {
        let bands = snapshot.bollinger_bands?;
        if price <= bands.lower {
            Some(Signal::new(
                SignalType::Buy,
                SignalFamily::Bollinger,
                "Price at lower Bollinger Band",
                self.strength,
            ))
        } else if price >= bands.upper {
            Some(Signal::new(
                SignalType::Sell,
                SignalFamily::Bollinger,
                "Price at upper Bollinger Band",
                self.strength,
            ))
        } else {
            None
        }
    }
}
