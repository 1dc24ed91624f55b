// tests/prediction_scenarios.rs
//
// End-to-end numeric scenarios for /api/prediction over a seeded in-memory
// store: the blend, the confidence dampener, and the error-label exclusion.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{self, Body};
use chrono::{Duration, NaiveDate};
use http::{Request, StatusCode};
use serde_json::Value as Json;
use tower::ServiceExt as _;

use rial_rate_analyzer::api::{create_router, AppState};
use rial_rate_analyzer::classify::FixedClassifier;
use rial_rate_analyzer::clock::{DateRange, FixedClock};
use rial_rate_analyzer::config::AppConfig;
use rial_rate_analyzer::feeds::{FeedError, NewsFeed, RateFeed, RawArticle};
use rial_rate_analyzer::store::{
    ArticleRecord, ArticleStore, RateSample, RateStore, SentimentLabel, SqliteStore,
};

const TODAY: &str = "2025-03-31";

struct NoopRateFeed;

#[async_trait]
impl RateFeed for NoopRateFeed {
    async fn latest_usd_irr(&self) -> Result<f64, FeedError> {
        Ok(0.0)
    }
    fn name(&self) -> &'static str {
        "noop"
    }
}

struct NoopNewsFeed;

#[async_trait]
impl NewsFeed for NoopNewsFeed {
    async fn fetch_recent(&self, _range: DateRange) -> Result<Vec<RawArticle>, FeedError> {
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "noop"
    }
}

fn today() -> NaiveDate {
    TODAY.parse().unwrap()
}

fn state_over(store: SqliteStore) -> AppState {
    AppState {
        rates: Arc::new(store.clone()),
        articles: Arc::new(store),
        classifier: Arc::new(FixedClassifier(0.0)),
        rate_feed: Arc::new(NoopRateFeed),
        news_feed: Arc::new(NoopNewsFeed),
        clock: Arc::new(FixedClock(today())),
        config: Arc::new(AppConfig::default()),
    }
}

/// 30 daily samples at the given rate, ending yesterday.
async fn seed_flat_rates(store: &SqliteStore, rate: f64) {
    for offset in 1..=30 {
        RateStore::upsert(
            store,
            RateSample {
                date: today() - Duration::days(offset),
                rate,
            },
        )
        .await
        .unwrap();
    }
}

async fn seed_articles(store: &SqliteStore, label: SentimentLabel, n: usize) {
    for i in 0..n {
        ArticleStore::insert(
            store,
            ArticleRecord {
                title: format!("{} article {i}", label.as_str()),
                source: "Test".to_string(),
                published_at: today() - Duration::days(1 + (i % 20) as i64),
                description: String::new(),
                sentiment: label,
                url: String::new(),
            },
        )
        .await
        .unwrap();
    }
}

async fn fetch_prediction(store: SqliteStore) -> Json {
    let app = create_router(state_over(store));
    let req = Request::builder()
        .method("GET")
        .uri("/api/prediction")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn balanced_sentiment_predicts_the_plain_average() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_flat_rates(&store, 50_000.0).await;
    seed_articles(&store, SentimentLabel::Positive, 10).await;
    seed_articles(&store, SentimentLabel::Negative, 10).await;
    seed_articles(&store, SentimentLabel::Neutral, 10).await;

    let v = fetch_prediction(store).await;
    assert_eq!(v["tomorrowsPrediction"], "50000.00 IRR");
    assert_eq!(v["confidence"], "50.00");
}

#[tokio::test]
async fn no_articles_means_floor_confidence() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_flat_rates(&store, 123_456.0).await;

    let v = fetch_prediction(store).await;
    assert_eq!(v["tomorrowsPrediction"], "123456.00 IRR");
    assert_eq!(v["confidence"], "50.00");
}

#[tokio::test]
async fn half_quota_fully_positive_gives_75() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_flat_rates(&store, 50_000.0).await;
    seed_articles(&store, SentimentLabel::Positive, 15).await;

    let v = fetch_prediction(store).await;
    // avgSentiment = 1, count = 15 → factor 0.5 → 50 + 1*50*0.5.
    assert_eq!(v["confidence"], "75.00");
    assert_eq!(v["tomorrowsPrediction"], "50050.00 IRR");
}

#[tokio::test]
async fn error_labels_do_not_dilute_the_signal() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_flat_rates(&store, 50_000.0).await;
    seed_articles(&store, SentimentLabel::Positive, 15).await;
    seed_articles(&store, SentimentLabel::Error, 10).await;

    let v = fetch_prediction(store).await;
    // Identical to the error-free scenario above.
    assert_eq!(v["confidence"], "75.00");
    assert_eq!(v["tomorrowsPrediction"], "50050.00 IRR");
}

#[tokio::test]
async fn articles_outside_the_window_are_ignored() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_flat_rates(&store, 50_000.0).await;

    // Well outside the 30-day window.
    for i in 0..20 {
        ArticleStore::insert(
            &store,
            ArticleRecord {
                title: format!("stale {i}"),
                source: "Test".to_string(),
                published_at: today() - Duration::days(120 + i),
                description: String::new(),
                sentiment: SentimentLabel::Negative,
                url: String::new(),
            },
        )
        .await
        .unwrap();
    }

    let v = fetch_prediction(store).await;
    assert_eq!(v["tomorrowsPrediction"], "50000.00 IRR");
    assert_eq!(v["confidence"], "50.00");
}
