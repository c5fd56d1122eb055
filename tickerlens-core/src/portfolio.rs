//! Holdings built from buy transactions, enriched with live quotes, plus
//! dividends received and the portfolio-level summary.

use crate::domain::{canonical_ticker, Quote, Ticker};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const UNKNOWN_SECTOR: &str = "Unknown";

/// A single buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub ticker: Ticker,
    pub date: NaiveDate,
    pub cost_usd: f64,
    pub shares: f64,
    pub price_per_share: f64,
    #[serde(default)]
    pub sector: Option<String>,
}

/// A dividend payment received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub ticker: Ticker,
    pub date: NaiveDate,
    pub amount: f64,
}

pub fn total_dividends(dividends: &[Dividend]) -> f64 {
    dividends.iter().map(|d| d.amount).sum()
}

/// Aggregated position in one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: Ticker,
    pub total_shares: f64,
    pub total_invested: f64,
    pub sector: String,
    pub transactions: Vec<Transaction>,
}

impl Holding {
    /// Group transactions by ticker, keeping first-seen order.
    ///
    /// Totals are always recomputed from the transactions. The sector is the
    /// first one any transaction names, or "Unknown".
    pub fn from_transactions(transactions: &[Transaction]) -> Vec<Holding> {
        let mut holdings: Vec<Holding> = Vec::new();
        let mut index: HashMap<Ticker, usize> = HashMap::new();

        for tx in transactions {
            let ticker = canonical_ticker(&tx.ticker);
            let slot = *index.entry(ticker.clone()).or_insert_with(|| {
                holdings.push(Holding {
                    ticker,
                    total_shares: 0.0,
                    total_invested: 0.0,
                    sector: UNKNOWN_SECTOR.to_string(),
                    transactions: Vec::new(),
                });
                holdings.len() - 1
            });
            let holding = &mut holdings[slot];
            if holding.sector == UNKNOWN_SECTOR {
                if let Some(sector) = tx.sector.as_deref().filter(|s| !s.trim().is_empty()) {
                    holding.sector = sector.to_string();
                }
            }
            holding.transactions.push(tx.clone());
        }

        for h in &mut holdings {
            h.recalc();
        }
        holdings
    }

    fn recalc(&mut self) {
        self.total_shares = self.transactions.iter().map(|t| t.shares).sum();
        self.total_invested = self.transactions.iter().map(|t| t.cost_usd).sum();
    }

    /// Average cost per share. `None` when no shares are held.
    pub fn avg_cost(&self) -> Option<f64> {
        (self.total_shares != 0.0).then(|| self.total_invested / self.total_shares)
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.total_shares * price
    }

    pub fn pnl(&self, price: f64) -> PnL {
        let current_value = self.market_value(price);
        let pnl = current_value - self.total_invested;
        let pnl_percent = if self.total_invested > 0.0 {
            pnl / self.total_invested * 100.0
        } else {
            0.0
        };
        PnL {
            current_value,
            pnl,
            pnl_percent,
        }
    }

    /// Today's move in dollars and percent. Each half is `None` when the
    /// quote lacks the field it depends on.
    pub fn daily_change(&self, quote: &Quote) -> DailyChange {
        DailyChange {
            amount: quote
                .previous_close
                .map(|prev| self.total_shares * (quote.price - prev)),
            percent: quote.change_percent,
        }
    }

    /// Percent of `portfolio_value` held in this position.
    pub fn weight(&self, price: f64, portfolio_value: f64) -> f64 {
        if portfolio_value == 0.0 {
            return 0.0;
        }
        self.market_value(price) / portfolio_value * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnL {
    pub current_value: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub amount: Option<f64>,
    pub percent: Option<f64>,
}

/// A holding joined with its quote and derived figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingWithQuote {
    #[serde(flatten)]
    pub holding: Holding,
    pub quote: Quote,
    pub current_value: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub daily_change: Option<f64>,
    pub daily_change_percent: Option<f64>,
    pub weight: f64,
    pub avg_cost: Option<f64>,
}

/// Join holdings with quotes keyed by ticker.
///
/// Holdings without a quote are skipped and do not count toward the
/// portfolio value used for weights. Output is sorted by current value,
/// largest first.
pub fn enrich_holdings(
    holdings: &[Holding],
    quotes: &HashMap<Ticker, Quote>,
) -> Vec<HoldingWithQuote> {
    let total_value: f64 = holdings
        .iter()
        .filter_map(|h| quotes.get(&h.ticker).map(|q| h.market_value(q.price)))
        .sum();

    let mut enriched: Vec<HoldingWithQuote> = holdings
        .iter()
        .filter_map(|h| {
            let quote = quotes.get(&h.ticker)?;
            let pnl = h.pnl(quote.price);
            let daily = h.daily_change(quote);
            Some(HoldingWithQuote {
                holding: h.clone(),
                quote: quote.clone(),
                current_value: pnl.current_value,
                pnl: pnl.pnl,
                pnl_percent: pnl.pnl_percent,
                daily_change: daily.amount,
                daily_change_percent: daily.percent,
                weight: h.weight(quote.price, total_value),
                avg_cost: h.avg_cost(),
            })
        })
        .collect();

    enriched.sort_by(|a, b| b.current_value.total_cmp(&a.current_value));
    enriched
}

/// Sum of enriched holdings' current values.
pub fn portfolio_value(holdings: &[HoldingWithQuote]) -> f64 {
    holdings.iter().map(|h| h.current_value).sum()
}

/// Share of portfolio value held in one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWeight {
    pub sector: String,
    pub weight: f64,
}

/// Portfolio-level totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub total_value: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    pub total_dividends: f64,
    /// Largest first.
    pub sectors: Vec<SectorWeight>,
}

impl PortfolioSummary {
    /// Summarize a portfolio.
    ///
    /// `total_invested` counts every holding, quoted or not; `total_value`
    /// only the enriched ones. Sector weights sum the enriched holdings'
    /// weights per sector.
    pub fn build(
        holdings: &[Holding],
        enriched: &[HoldingWithQuote],
        dividends: &[Dividend],
    ) -> Self {
        let total_invested: f64 = holdings.iter().map(|h| h.total_invested).sum();
        let total_value = portfolio_value(enriched);
        let total_pnl = total_value - total_invested;
        let total_pnl_percent = if total_invested > 0.0 {
            total_pnl / total_invested * 100.0
        } else {
            0.0
        };

        let mut sectors: Vec<SectorWeight> = Vec::new();
        for h in enriched {
            match sectors.iter_mut().find(|s| s.sector == h.holding.sector) {
                Some(s) => s.weight += h.weight,
                None => sectors.push(SectorWeight {
                    sector: h.holding.sector.clone(),
                    weight: h.weight,
                }),
            }
        }
        sectors.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        Self {
            total_invested,
            total_value,
            total_pnl,
            total_pnl_percent,
            total_dividends: total_dividends(dividends),
            sectors,
        }
    }
}
