//! # Window aggregation
//! Read-only aggregates over persisted samples. The rate side treats an
//! empty window as an error; the sentiment side treats it as neutral.

use crate::clock::DateRange;
use crate::error::ApiError;
use crate::store::{ArticleStore, RateStore, SentimentLabel};

/// Net sentiment over a window: mean label score plus the number of rows
/// that carried a usable label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentSummary {
    /// Mean of per-article scores, in [-1, 1]. Zero when `count == 0`.
    pub avg: f64,
    /// Labeled rows considered; `error` rows are not counted.
    pub count: usize,
}

impl SentimentSummary {
    pub const NEUTRAL: SentimentSummary = SentimentSummary { avg: 0.0, count: 0 };
}

/// Arithmetic mean of all rate samples inside the window.
///
/// Zero matching rows is a `NoData` error, never a defaulted average.
pub async fn average_rate(store: &dyn RateStore, range: DateRange) -> Result<f64, ApiError> {
    let samples = store.in_range(range).await?;
    mean(samples.iter().map(|s| s.rate)).ok_or(ApiError::NoData("exchange rate"))
}

/// Net sentiment of all articles inside the window. An empty window yields
/// `SentimentSummary::NEUTRAL`; sentiment absence is not an error condition.
pub async fn sentiment_summary(
    store: &dyn ArticleStore,
    range: DateRange,
) -> Result<SentimentSummary, ApiError> {
    let labels = store.labels_in_range(range).await?;
    Ok(summarize(&labels))
}

/// Pure label fold: positive → +1, neutral → 0, negative → −1, error → skip.
pub fn summarize(labels: &[SentimentLabel]) -> SentimentSummary {
    let mut sum = 0i64;
    let mut count = 0usize;
    for label in labels {
        if let Some(score) = label.score() {
            sum += i64::from(score);
            count += 1;
        }
    }
    let avg = if count > 0 {
        sum as f64 / count as f64
    } else {
        0.0
    };
    SentimentSummary { avg, count }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}
