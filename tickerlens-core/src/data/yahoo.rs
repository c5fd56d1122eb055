//! Yahoo Finance data provider.
//!
//! Candles come from the v8 chart API, quotes from the v7 quote API. Handles
//! rate limiting, retries with exponential backoff, response parsing and the
//! circuit breaker.
//!
//! Yahoo has no official API and changes its payloads without notice; parse
//! failures surface as `DataError::ResponseFormatChanged`.

use super::circuit_breaker::CircuitBreaker;
use super::ingest::ingest_candles;
use super::provider::{ChartRange, DataError, DataSource, MarketDataProvider, RawCandle};
use crate::domain::{Candle, Quote};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_BASE: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

fn base_url(base: &str) -> Result<Url, DataError> {
    Url::parse(base).map_err(|e| DataError::Other(format!("bad base URL {base}: {e}")))
}

// ── Chart payload ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

// ── Quote payload ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    quote_response: QuoteResult,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    result: Option<Vec<QuotePayload>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotePayload {
    regular_market_price: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<u64>,
    market_cap: Option<f64>,
    short_name: Option<String>,
    long_name: Option<String>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<f64>,
    dividend_yield: Option<f64>,
    average_analyst_rating: Option<String>,
    target_mean_price: Option<f64>,
    target_high_price: Option<f64>,
    target_low_price: Option<f64>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Self::with_timeout(circuit_breaker, Duration::from_secs(30))
    }

    pub fn with_timeout(
        circuit_breaker: Arc<CircuitBreaker>,
        timeout: Duration,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn chart_url(ticker: &str, range: ChartRange, today: NaiveDate) -> Result<Url, DataError> {
        let start_ts = range
            .start_date(today)
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        let end_ts = today
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(i64::MAX);

        let mut url = base_url(CHART_BASE)?;
        url.path_segments_mut()
            .map_err(|_| DataError::Other(format!("{CHART_BASE} cannot take a path")))?
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", range.interval().as_query());
        Ok(url)
    }

    fn quote_url(ticker: &str) -> Result<Url, DataError> {
        let mut url = base_url(QUOTE_BASE)?;
        url.query_pairs_mut().append_pair("symbols", ticker);
        Ok(url)
    }

    /// GET a JSON document with retry, backoff and circuit breaker bookkeeping.
    fn get_json<T: DeserializeOwned>(&self, ticker: &str, url: &Url) -> Result<T, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(ticker, attempt, ?delay, "retrying Yahoo request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url.clone()).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(ticker, retry_after, "rate limited by Yahoo");
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    ticker: ticker.to_string(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {ticker}")));
                continue;
            }

            let body = resp.json::<T>().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
            })?;
            self.circuit_breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

fn api_error(ticker: &str, err: Option<ApiError>, empty: &str) -> DataError {
    match err {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            ticker: ticker.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged(empty.into()),
    }
}

/// Turn a chart payload into raw candles (one per timestamp).
fn parse_chart(ticker: &str, resp: ChartResponse) -> Result<Vec<RawCandle>, DataError> {
    let ChartResult { result, error } = resp.chart;
    let data = result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| api_error(ticker, error, "empty chart result with no error"))?;

    // No timestamps: the ticker exists but has no history in the window.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;
            Ok(RawCandle {
                date,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: quote.close.get(i).copied().flatten(),
                volume: quote.volume.get(i).copied().flatten(),
            })
        })
        .collect()
}

fn parse_quote(ticker: &str, resp: QuoteResponse) -> Result<Quote, DataError> {
    let QuoteResult { result, error } = resp.quote_response;
    let p = result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| match error {
            None => DataError::SymbolNotFound {
                ticker: ticker.to_string(),
            },
            err => api_error(ticker, err, "empty quote result"),
        })?;

    let price = p
        .regular_market_price
        .filter(|p| p.is_finite())
        .ok_or_else(|| DataError::MissingPrice {
            ticker: ticker.to_string(),
        })?;

    Ok(Quote {
        ticker: ticker.to_string(),
        name: p
            .short_name
            .or(p.long_name)
            .unwrap_or_else(|| ticker.to_string()),
        price,
        previous_close: p.regular_market_previous_close,
        change: p.regular_market_change,
        change_percent: p.regular_market_change_percent,
        day_high: p.regular_market_day_high,
        day_low: p.regular_market_day_low,
        volume: p.regular_market_volume,
        market_cap: p.market_cap,
        fifty_two_week_high: p.fifty_two_week_high,
        fifty_two_week_low: p.fifty_two_week_low,
        pe_ratio: p.trailing_pe,
        forward_pe: p.forward_pe,
        dividend_yield: p.dividend_yield,
        average_analyst_rating: p.average_analyst_rating,
        target_mean_price: p.target_mean_price,
        target_high_price: p.target_high_price,
        target_low_price: p.target_low_price,
    })
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn quote(&self, ticker: &str) -> Result<Quote, DataError> {
        let resp: QuoteResponse = self.get_json(ticker, &Self::quote_url(ticker)?)?;
        parse_quote(ticker, resp)
    }

    fn candles(&self, ticker: &str, range: ChartRange) -> Result<Vec<Candle>, DataError> {
        let today = chrono::Utc::now().date_naive();
        let url = Self::chart_url(ticker, range, today)?;
        let resp: ChartResponse = self.get_json(ticker, &url)?;
        let report = ingest_candles(parse_chart(ticker, resp)?);
        if report.dropped > 0 {
            debug!(ticker, dropped = report.dropped, "dropped incomplete candles");
        }
        Ok(report.candles)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
