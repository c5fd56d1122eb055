//! Market data: providers, ingest and the request circuit breaker.

pub mod circuit_breaker;
pub mod ingest;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use ingest::{ingest_candles, IngestReport};
pub use provider::{ChartRange, DataError, DataSource, Interval, MarketDataProvider, RawCandle};
pub use synthetic::{resample_weekly, SyntheticProvider};
pub use yahoo::YahooProvider;
