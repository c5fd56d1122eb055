//! TickerLens CLI — technical analysis and opportunity scanning commands.
//!
//! Commands:
//! - `analyze` — indicator snapshot, signals and score for one ticker
//! - `scan` — rank a ticker universe by opportunity score
//! - `hot` — count opportunities at or above the hot threshold
//! - `portfolio` — holdings from a config file, enriched with live quotes
//! - `quote` — quote snapshots

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tickerlens_core::data::{
    ChartRange, CircuitBreaker, DataSource, MarketDataProvider, SyntheticProvider, YahooProvider,
};
use tickerlens_core::domain::{canonical_ticker, Quote, Ticker};
use tickerlens_core::portfolio::enrich_holdings;
use tickerlens_core::signals::SignalType;
use tickerlens_core::{analyze, score_opportunity, Opportunity};
use tickerlens_runner::{dedup_tickers, export_json, save_report, ScanConfig, ScanReport, Scanner};

#[derive(Parser)]
#[command(
    name = "tickerlens",
    about = "TickerLens CLI — technical indicators, signals and opportunity scores"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Indicators, signals and score for a single ticker.
    Analyze {
        ticker: String,

        /// History range: 1mo, 3mo, 6mo, 1y, 2y, 5y.
        #[arg(long, default_value = "1y")]
        range: String,

        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Use synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Rank tickers by opportunity score.
    Scan {
        #[command(flatten)]
        input: ScanInput,

        /// Write report.json and opportunities.csv into this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the report as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print how many scanned tickers are hot opportunities.
    Hot {
        #[command(flatten)]
        input: ScanInput,
    },
    /// Holdings from a config file, enriched with live quotes.
    Portfolio {
        /// Path to a TOML config with [[transactions]].
        #[arg(long)]
        config: PathBuf,

        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Quote snapshots for one or more tickers.
    Quote {
        #[arg(required = true)]
        tickers: Vec<String>,

        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

/// Inputs shared by `scan` and `hot`.
#[derive(Args)]
struct ScanInput {
    /// Tickers to scan. Defaults to the config's holdings and watchlist.
    tickers: Vec<String>,

    /// Path to a TOML scan config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// History range; overrides the config.
    #[arg(long)]
    range: Option<String>,

    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            ticker,
            range,
            json,
            synthetic,
        } => run_analyze(&ticker, &range, json, synthetic),
        Commands::Scan {
            input,
            output_dir,
            json,
        } => run_scan(&input, output_dir, json),
        Commands::Hot { input } => run_hot(&input),
        Commands::Portfolio {
            config,
            json,
            synthetic,
        } => run_portfolio(&config, json, synthetic),
        Commands::Quote {
            tickers,
            json,
            synthetic,
        } => run_quote(&tickers, json, synthetic),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "tickerlens=debug"
    } else {
        "tickerlens=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_provider(synthetic: bool) -> Result<Box<dyn MarketDataProvider>> {
    if synthetic {
        warn!("using synthetic data: results are not real market data");
        return Ok(Box::new(SyntheticProvider::new()));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker).context("failed to set up Yahoo provider")?;
    Ok(Box::new(provider))
}

fn parse_range(raw: &str) -> ChartRange {
    ChartRange::parse(raw).unwrap_or_else(|| {
        let fallback = ChartRange::default();
        warn!(range = raw, %fallback, "unrecognized range, using default");
        fallback
    })
}

// ─── analyze ────────────────────────────────────────────────────────

fn run_analyze(ticker: &str, range: &str, json: bool, synthetic: bool) -> Result<()> {
    let ticker = canonical_ticker(ticker);
    if ticker.is_empty() {
        bail!("ticker must not be empty");
    }
    let provider = build_provider(synthetic)?;
    let range = parse_range(range);

    let candles = provider
        .candles(&ticker, range)
        .with_context(|| format!("failed to fetch candles for {ticker}"))?;
    if candles.is_empty() {
        bail!("no candle history for {ticker} over {range}");
    }
    let analysis = analyze(&ticker, &candles);

    let opportunity = match provider.quote(&ticker) {
        Ok(quote) => Some(score_opportunity(&quote, &analysis)),
        Err(e) => {
            warn!(ticker = %ticker, error = %e, "no quote, skipping score");
            None
        }
    };

    if json {
        let out = serde_json::json!({
            "analysis": analysis,
            "opportunity": opportunity,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let snap = &analysis.snapshot;
    println!("{ticker} ({} candles, {range})", candles.len());
    println!("  RSI(14)   {}", fmt_opt(snap.rsi14));
    println!("  SMA(20)   {}", fmt_opt(snap.sma20));
    println!("  SMA(50)   {}", fmt_opt(snap.sma50));
    println!("  SMA(200)  {}", fmt_opt(snap.sma200));
    println!("  EMA(12)   {}", fmt_opt(snap.ema12));
    println!("  EMA(26)   {}", fmt_opt(snap.ema26));
    match snap.macd {
        Some(m) => println!(
            "  MACD      {:.2} / signal {:.2} / hist {:.2}",
            m.macd, m.signal, m.histogram
        ),
        None => println!("  MACD      -"),
    }
    match snap.bollinger_bands {
        Some(b) => println!(
            "  Bollinger {:.2} / {:.2} / {:.2}",
            b.upper, b.middle, b.lower
        ),
        None => println!("  Bollinger -"),
    }

    println!();
    if analysis.signals.is_empty() {
        println!("No signals.");
    }
    for s in &analysis.signals {
        println!(
            "  [{:<7}] {:<9} {:>5.1}  {}",
            signal_label(s.signal_type),
            s.indicator,
            s.strength,
            s.message
        );
    }

    if let Some(opp) = opportunity {
        println!();
        println!("Score: {:.1} ({:?})", opp.score, opp.tier());
    }
    Ok(())
}

// ─── scan / hot ─────────────────────────────────────────────────────

fn scan_from_input(input: &ScanInput) -> Result<ScanReport> {
    let config = match &input.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };

    let universe: Vec<Ticker> = if input.tickers.is_empty() {
        config.universe()
    } else {
        dedup_tickers(input.tickers.iter().map(String::as_str))
    };
    if universe.is_empty() {
        bail!("no tickers to scan: pass tickers or --config with a watchlist or transactions");
    }

    let range = match &input.range {
        Some(r) => parse_range(r),
        None => config.chart_range()?,
    };

    let provider = build_provider(input.synthetic)?;
    let report = Scanner::new(provider.as_ref(), range)
        .with_hot_threshold(config.hot_threshold)
        .scan(&universe)?;

    Ok(match &input.config {
        Some(_) => report.with_config_hash(config.config_hash()),
        None => report,
    })
}

fn run_scan(input: &ScanInput, output_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let report = scan_from_input(input)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(dir) = output_dir {
        let (json_path, csv_path) = save_report(&report, &dir)?;
        info!(
            json = %json_path.display(),
            csv = %csv_path.display(),
            "report saved"
        );
    }
    Ok(())
}

fn run_hot(input: &ScanInput) -> Result<()> {
    let report = scan_from_input(input)?;
    println!("{}", report.hot_count);
    Ok(())
}

fn print_report(report: &ScanReport) {
    println!(
        "{:<4} {:<8} {:>10} {:>6} {:>6} {:>9} {:>9} {:>9}  Signals",
        "#", "Ticker", "Price", "Score", "RSI", "vsSMA200", "vs52wLo", "Target"
    );
    for (i, o) in report.opportunities.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:>10.2} {:>6.1} {:>6} {:>9} {:>9} {:>9}  {}",
            i + 1,
            o.ticker,
            o.price,
            o.score,
            fmt_opt_prec(o.rsi, 1),
            fmt_pct(o.distance_from_sma200),
            fmt_pct(o.distance_from_52w_low),
            fmt_pct(o.below_analyst_target),
            signal_summary(o),
        );
    }
    for issue in &report.skipped {
        println!("skipped {}: {}", issue.ticker, issue.reason);
    }
    for issue in &report.failed {
        println!("failed  {}: {}", issue.ticker, issue.reason);
    }
    println!();
    println!(
        "{} scored, {} hot (score >= {})",
        report.opportunities.len(),
        report.hot_count,
        report.hot_threshold
    );
    if report.source == DataSource::Synthetic {
        println!("(synthetic data, not real market prices)");
    }
}

fn signal_summary(o: &Opportunity) -> String {
    o.signals
        .iter()
        .filter(|s| s.is_actionable())
        .map(|s| format!("{}:{}", s.indicator, signal_label(s.signal_type)))
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── portfolio ──────────────────────────────────────────────────────

fn run_portfolio(config_path: &Path, json: bool, synthetic: bool) -> Result<()> {
    let config = ScanConfig::from_file(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let holdings = config.holdings();
    if holdings.is_empty() {
        bail!("config has no [[transactions]]");
    }

    let provider = build_provider(synthetic)?;
    let mut quotes: HashMap<Ticker, Quote> = HashMap::new();
    for h in &holdings {
        match provider.quote(&h.ticker) {
            Ok(q) => {
                quotes.insert(h.ticker.clone(), q);
            }
            Err(e) => warn!(ticker = %h.ticker, error = %e, "no quote, holding skipped"),
        }
    }

    let enriched = enrich_holdings(&holdings, &quotes);
    let summary = config.portfolio_summary(&enriched);
    if json {
        let out = serde_json::json!({
            "holdings": enriched,
            "dividends": config.dividends,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<12} {:>12} {:>10} {:>10} {:>12} {:>12} {:>8} {:>10} {:>7}",
        "Ticker", "Sector", "Shares", "AvgCost", "Price", "Value", "P&L", "P&L%", "Day", "Weight"
    );
    for h in &enriched {
        println!(
            "{:<8} {:<12} {:>12.6} {:>10} {:>10.2} {:>12.2} {:>12.2} {:>8} {:>10} {:>6.1}%",
            h.holding.ticker,
            h.holding.sector,
            h.holding.total_shares,
            fmt_opt(h.avg_cost),
            h.quote.price,
            h.current_value,
            h.pnl,
            fmt_pct(Some(h.pnl_percent)),
            fmt_opt(h.daily_change),
            h.weight,
        );
    }
    println!();
    println!(
        "Invested {:.2}, value {:.2}, P&L {:.2} ({}), dividends {:.2}",
        summary.total_invested,
        summary.total_value,
        summary.total_pnl,
        fmt_pct(Some(summary.total_pnl_percent)),
        summary.total_dividends,
    );
    if !summary.sectors.is_empty() {
        println!("Sectors:");
        for s in &summary.sectors {
            println!("  {:<16} {:>6.1}%", s.sector, s.weight);
        }
    }
    Ok(())
}

// ─── quote ──────────────────────────────────────────────────────────

fn run_quote(tickers: &[String], json: bool, synthetic: bool) -> Result<()> {
    let provider = build_provider(synthetic)?;
    let tickers = dedup_tickers(tickers.iter().map(String::as_str));

    let mut quotes = Vec::new();
    let mut failures = 0usize;
    for t in &tickers {
        match provider.quote(t) {
            Ok(q) => quotes.push(q),
            Err(e) => {
                failures += 1;
                eprintln!("Error for {t}: {e}");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&quotes)?);
    } else {
        for q in &quotes {
            println!(
                "{:<8} {:>10.2} {:>9}  52w {} - {}  target {}  {}",
                q.ticker,
                q.price,
                fmt_pct(q.change_percent),
                fmt_opt(q.fifty_two_week_low),
                fmt_opt(q.fifty_two_week_high),
                fmt_opt(q.target_mean_price),
                q.name,
            );
        }
    }

    if quotes.is_empty() && failures > 0 {
        bail!("no quotes retrieved");
    }
    Ok(())
}

// ─── formatting ─────────────────────────────────────────────────────

fn signal_label(t: SignalType) -> &'static str {
    match t {
        SignalType::Buy => "buy",
        SignalType::Sell => "sell",
        SignalType::Neutral => "neutral",
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    fmt_opt_prec(v, 2)
}

fn fmt_opt_prec(v: Option<f64>, prec: usize) -> String {
    v.map(|x| format!("{x:.prec$}")).unwrap_or_else(|| "-".into())
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{x:+.2}%")).unwrap_or_else(|| "-".into())
}
