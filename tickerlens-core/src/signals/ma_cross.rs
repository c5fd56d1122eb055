//! Golden/death cross: SMA(50) relative to SMA(200).

use super::{Signal, SignalFamily, SignalRule, SignalType};
use crate::analysis::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct MaCrossRule {
    pub strength: f64,
}

impl Default for MaCrossRule {
    fn default() -> Self {
        Self { strength: 40.0 }
    }
}

impl SignalRule for MaCrossRule {
    fn family(&self) -> SignalFamily {
        SignalFamily::MaCross
    }

    fn evaluate(&self, _price: f64, snapshot: &IndicatorSnapshot) -> Option<Signal> {
        let (sma50, sma200) = (snapshot.sma50?, snapshot.sma200?);
        let signal = if sma50 > sma200 {
            Signal::new(
                SignalType::Buy,
                SignalFamily::MaCross,
                "Golden cross: SMA(50) above SMA(200)",
                self.strength,
            )
        } else {
            Signal::new(
                SignalType::Sell,
                SignalFamily::MaCross,
                "Death cross: SMA(50) below SMA(200)",
                self.strength,
            )
        };
        Some(signal)
    }
}
