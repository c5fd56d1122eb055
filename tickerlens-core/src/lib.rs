//! TickerLens Core — indicators, signals, opportunity scoring and market data.
//!
//! This crate contains the analysis engine:
//! - Domain types (candles, quotes)
//! - Rolling indicators over closing prices (SMA, EMA, RSI, MACD, Bollinger)
//! - Per-family signal rules evaluated at the latest close
//! - Composite 0..=100 opportunity score
//! - Market data providers (Yahoo Finance, synthetic) behind one trait
//! - Portfolio holdings enriched with live quotes

pub mod analysis;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod portfolio;
pub mod scoring;
pub mod signals;

pub use analysis::{analyze, IndicatorSnapshot, TechnicalAnalysis};
pub use scoring::{score_opportunity, Opportunity, ScoreTier};
pub use signals::{Signal, SignalFamily, SignalType};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the scanner shares across worker
    /// threads is Send + Sync. If any type fails, the build breaks here.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Quote>();
        require_sync::<domain::Quote>();

        // Analysis output
        require_send::<IndicatorSnapshot>();
        require_sync::<IndicatorSnapshot>();
        require_send::<TechnicalAnalysis>();
        require_sync::<TechnicalAnalysis>();
        require_send::<Opportunity>();
        require_sync::<Opportunity>();

        // Providers
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();

        // Portfolio
        require_send::<portfolio::HoldingWithQuote>();
        require_sync::<portfolio::HoldingWithQuote>();
        require_send::<portfolio::PortfolioSummary>();
        require_sync::<portfolio::PortfolioSummary>();
    }

    /// Signal rules see price and indicators only, never quote fundamentals.
    #[test]
    fn signal_rule_trait_takes_no_quote() {
        fn _check_trait_object_builds(
            rule: &dyn signals::SignalRule,
            snapshot: &IndicatorSnapshot,
        ) -> Option<Signal> {
            rule.evaluate(100.0, snapshot)
        }
    }
}
