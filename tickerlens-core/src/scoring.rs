//! Opportunity Scorer — folds quote fundamentals and technicals into one 0..=100 score.
//!
//! Base score 50, then independent additive deltas, clamped at the end. The
//! deltas are empirical weights and are kept as literals.

use crate::analysis::TechnicalAnalysis;
use crate::domain::Quote;
use crate::signals::sma200::percent_distance;
use crate::signals::Signal;
use serde::{Deserialize, Serialize};

pub const BASE_SCORE: f64 = 50.0;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;
/// Scores at or above this are "hot" opportunities.
pub const HOT_SCORE: f64 = 70.0;

/// Which scoring rule produced a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Rsi,
    Sma200Distance,
    FiftyTwoWeekLow,
    AnalystTarget,
    MacdHistogram,
    BollingerLower,
}

/// A single non-zero delta applied to the base score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub factor: ScoreFactor,
    pub delta: f64,
}

/// Intermediate metrics and deltas behind a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rsi: Option<f64>,
    pub distance_from_sma200: Option<f64>,
    pub distance_from_52w_low: Option<f64>,
    pub below_analyst_target: Option<f64>,
    pub contributions: Vec<ScoreContribution>,
}

impl ScoreBreakdown {
    /// Base plus all deltas, before clamping.
    pub fn raw_score(&self) -> f64 {
        BASE_SCORE + self.contributions.iter().map(|c| c.delta).sum::<f64>()
    }

    /// Final score clamped to [0, 100]. Not rounded.
    pub fn score(&self) -> f64 {
        self.raw_score().clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Coarse classification of a score for display and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Hot,
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= HOT_SCORE {
            Self::Hot
        } else if score >= BASE_SCORE {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

/// Scored ticker. Built fresh per request; never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub score: f64,
    pub signals: Vec<Signal>,
    pub rsi: Option<f64>,
    pub distance_from_sma200: Option<f64>,
    pub distance_from_52w_low: Option<f64>,
    pub below_analyst_target: Option<f64>,
}

impl Opportunity {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }

    pub fn is_hot(&self) -> bool {
        self.score >= HOT_SCORE
    }
}

/// Compute the metrics and deltas for a quote and its technical analysis.
pub fn score_breakdown(quote: &Quote, analysis: &TechnicalAnalysis) -> ScoreBreakdown {
    let snapshot = &analysis.snapshot;
    let price = quote.price;
    let mut contributions = Vec::new();
    let mut push = |factor: ScoreFactor, delta: f64| {
        contributions.push(ScoreContribution { factor, delta });
    };

    let rsi = snapshot.rsi14;
    if let Some(rsi) = rsi {
        if rsi < 30.0 {
            push(ScoreFactor::Rsi, 20.0);
        } else if rsi < 40.0 {
            push(ScoreFactor::Rsi, 10.0);
        } else if rsi > 70.0 {
            push(ScoreFactor::Rsi, -15.0);
        }
    }

    let distance_from_sma200 = snapshot.sma200.map(|sma| percent_distance(price, sma));
    if let Some(dist) = distance_from_sma200 {
        if dist < -10.0 {
            push(ScoreFactor::Sma200Distance, 15.0);
        } else if dist < -5.0 {
            push(ScoreFactor::Sma200Distance, 10.0);
        } else if dist > 20.0 {
            push(ScoreFactor::Sma200Distance, -10.0);
        }
    }

    let distance_from_52w_low = quote
        .fifty_two_week_low
        .filter(|low| *low > 0.0)
        .map(|low| percent_distance(price, low));
    if let Some(dist) = distance_from_52w_low {
        if dist < 10.0 {
            push(ScoreFactor::FiftyTwoWeekLow, 15.0);
        } else if dist < 20.0 {
            push(ScoreFactor::FiftyTwoWeekLow, 5.0);
        }
    }

    let below_analyst_target = quote
        .target_mean_price
        .filter(|target| *target > 0.0)
        .map(|target| (target - price) / price * 100.0);
    if let Some(upside) = below_analyst_target {
        if upside > 20.0 {
            push(ScoreFactor::AnalystTarget, 15.0);
        } else if upside > 10.0 {
            push(ScoreFactor::AnalystTarget, 10.0);
        } else if upside < 0.0 {
            push(ScoreFactor::AnalystTarget, -10.0);
        }
    }

    if snapshot.macd.is_some_and(|m| m.histogram > 0.0) {
        push(ScoreFactor::MacdHistogram, 5.0);
    }

    if snapshot.bollinger_bands.is_some_and(|b| price <= b.lower) {
        push(ScoreFactor::BollingerLower, 10.0);
    }

    ScoreBreakdown {
        rsi,
        distance_from_sma200,
        distance_from_52w_low,
        below_analyst_target,
        contributions,
    }
}

/// Score a ticker. Signals pass through unchanged.
pub fn score_opportunity(quote: &Quote, analysis: &TechnicalAnalysis) -> Opportunity {
    let breakdown = score_breakdown(quote, analysis);
    Opportunity {
        ticker: quote.ticker.clone(),
        name: quote.name.clone(),
        price: quote.price,
        score: breakdown.score(),
        signals: analysis.signals.clone(),
        rsi: breakdown.rsi,
        distance_from_sma200: breakdown.distance_from_sma200,
        distance_from_52w_low: breakdown.distance_from_52w_low,
        below_analyst_target: breakdown.below_analyst_target,
    }
}
