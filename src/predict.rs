//! # Predictor
//! Pure, testable blend of the two window aggregates into a point forecast
//! and a confidence percentage. No I/O in `blend`; the composition fetches
//! both aggregates concurrently and fails the request when the rate side
//! has no data.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::aggregate::{self, SentimentSummary};
use crate::clock::DateRange;
use crate::error::ApiError;
use crate::store::{ArticleStore, RateStore};

/// Tunables for the blend. Observed deployments disagree on the sensitivity
/// value, so it is configuration, not law.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PredictionTuning {
    /// Trailing window, in days, for both aggregates.
    pub window_days: i64,
    /// How much sentiment polarity nudges the rate.
    pub sensitivity: f64,
    /// Article count at which the sentiment signal is fully trusted.
    pub full_quota: usize,
}

impl Default for PredictionTuning {
    fn default() -> Self {
        Self {
            window_days: 30,
            sensitivity: 0.001,
            full_quota: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub predicted_rate: f64,
    /// Percentage in [50, 100]. 50 means "no sentiment signal at all".
    pub confidence: f64,
}

/// Deterministic blend of the two aggregates.
///
/// The sentiment factor discounts confidence when fewer than `full_quota`
/// articles were observed in the window; confidence is maximal only for a
/// fully polarized signal at full quota.
pub fn blend(avg_rate: f64, sentiment: SentimentSummary, tuning: &PredictionTuning) -> Forecast {
    let predicted_rate = avg_rate * (1.0 + sentiment.avg * tuning.sensitivity);
    let sentiment_factor = (sentiment.count as f64 / tuning.full_quota as f64).min(1.0);
    let confidence = 50.0 + sentiment.avg.abs() * 50.0 * sentiment_factor;
    Forecast {
        predicted_rate,
        confidence,
    }
}

/// Tomorrow's forecast from the trailing windows ending today.
///
/// The two aggregate reads are independent and commutative; they run
/// concurrently and the blend happens once both complete.
pub async fn tomorrow(
    rates: &dyn RateStore,
    articles: &dyn ArticleStore,
    today: NaiveDate,
    tuning: &PredictionTuning,
) -> Result<Forecast, ApiError> {
    let window = DateRange::trailing(today, tuning.window_days);
    let (avg_rate, sentiment) = tokio::join!(
        aggregate::average_rate(rates, window),
        aggregate::sentiment_summary(articles, window),
    );
    Ok(blend(avg_rate?, sentiment?, tuning))
}
