//! Domain types for TickerLens

pub mod candle;
pub mod quote;

pub use candle::{closes, Candle};
pub use quote::Quote;

/// Ticker symbol type alias
pub type Ticker = String;

/// Canonical form of a ticker symbol: trimmed and upper-cased.
pub fn canonical_ticker(raw: &str) -> Ticker {
    raw.trim().to_ascii_uppercase()
}
