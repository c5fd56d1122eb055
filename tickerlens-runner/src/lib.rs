//! TickerLens Runner — scan orchestration, ranking, configuration, export.
//!
//! This crate builds on `tickerlens-core` to provide:
//! - TOML scan configuration with ticker universe and holdings
//! - Parallel per-ticker scanning with isolated failures
//! - Ranked scan reports with hot-opportunity counts
//! - JSON and CSV report artifacts

pub mod config;
pub mod export;
pub mod scanner;

pub use config::{dedup_tickers, ConfigError, ScanConfig};
pub use export::{
    export_json, import_json, load_report, opportunities_csv, save_report, ExportError,
};
pub use scanner::{
    count_hot, rank_opportunities, scan_ticker, scan_universe, ScanError, ScanReport, Scanner,
    TickerIssue, TickerOutcome, SCHEMA_VERSION,
};
