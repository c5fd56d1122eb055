//! Quote — point-in-time market snapshot for a ticker.

use serde::{Deserialize, Serialize};

/// Live quote snapshot.
///
/// `price` is the only mandatory number. Every other field is `None` when the
/// data source did not supply it; consumers must not substitute zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub average_analyst_rating: Option<String>,
    pub target_mean_price: Option<f64>,
    pub target_high_price: Option<f64>,
    pub target_low_price: Option<f64>,
}

impl Quote {
    /// A quote with only ticker, display name and price populated.
    pub fn bare(ticker: impl Into<String>, price: f64) -> Self {
        let ticker = ticker.into();
        Self {
            name: ticker.clone(),
            ticker,
            price,
            previous_close: None,
            change: None,
            change_percent: None,
            day_high: None,
            day_low: None,
            volume: None,
            market_cap: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            pe_ratio: None,
            forward_pe: None,
            dividend_yield: None,
            average_analyst_rating: None,
            target_mean_price: None,
            target_high_price: None,
            target_low_price: None,
        }
    }
}
