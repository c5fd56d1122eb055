//! Report export — JSON and CSV artifacts for a scan.
//!
//! All persisted reports carry a `schema_version` field. Newer versions than
//! this build understands are rejected on load.

use std::path::{Path, PathBuf};

use thiserror::Error;

use tickerlens_core::signals::SignalType;

use crate::scanner::{ScanReport, SCHEMA_VERSION};

pub const REPORT_JSON: &str = "report.json";
pub const OPPORTUNITIES_CSV: &str = "opportunities.csv";

/// Errors writing or reading scan artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &ScanReport) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<ScanReport, ExportError> {
    let report: ScanReport = serde_json::from_str(json)?;
    if report.schema_version > SCHEMA_VERSION {
        return Err(ExportError::UnsupportedSchema {
            found: report.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_default()
}

/// Ranked opportunities as CSV, one row per ticker.
///
/// Columns: rank, ticker, name, price, score, rsi, distance_from_sma200,
/// distance_from_52w_low, below_analyst_target, buy_signals, sell_signals,
/// signals. Missing metrics are empty cells.
pub fn opportunities_csv(report: &ScanReport) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "rank",
        "ticker",
        "name",
        "price",
        "score",
        "rsi",
        "distance_from_sma200",
        "distance_from_52w_low",
        "below_analyst_target",
        "buy_signals",
        "sell_signals",
        "signals",
    ])?;

    for (i, o) in report.opportunities.iter().enumerate() {
        let count = |kind: SignalType| o.signals.iter().filter(|s| s.signal_type == kind).count();
        let messages = o
            .signals
            .iter()
            .map(|s| s.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        wtr.write_record([
            &(i + 1).to_string(),
            &o.ticker,
            &o.name,
            &format!("{:.4}", o.price),
            &format!("{:.2}", o.score),
            &opt(o.rsi),
            &opt(o.distance_from_sma200),
            &opt(o.distance_from_52w_low),
            &opt(o.below_analyst_target),
            &count(SignalType::Buy).to_string(),
            &count(SignalType::Sell).to_string(),
            &messages,
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Io {
            path: PathBuf::from(OPPORTUNITIES_CSV),
            source: std::io::Error::other(e.to_string()),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ─── Artifacts on disk ──────────────────────────────────────────────

/// Write `report.json` and `opportunities.csv` into `dir`, creating it if
/// needed. Returns the two paths.
pub fn save_report(report: &ScanReport, dir: &Path) -> Result<(PathBuf, PathBuf), ExportError> {
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;

    let json_path = dir.join(REPORT_JSON);
    std::fs::write(&json_path, export_json(report)?).map_err(io_err(&json_path))?;

    let csv_path = dir.join(OPPORTUNITIES_CSV);
    std::fs::write(&csv_path, opportunities_csv(report)?).map_err(io_err(&csv_path))?;

    Ok((json_path, csv_path))
}

pub fn load_report(path: &Path) -> Result<ScanReport, ExportError> {
    let json = std::fs::read_to_string(path).map_err(io_err(path))?;
    import_json(&json)
}
