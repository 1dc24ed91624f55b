// tests/ingest_batch.rs
//
// Batch ingestion semantics: per-article failure isolation, the empty-text
// shortcut, persistence-failure tolerance, and response ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use rial_rate_analyzer::classify::{ClassifyError, LabelThresholds, SentimentClassifier};
use rial_rate_analyzer::clock::DateRange;
use rial_rate_analyzer::feeds::RawArticle;
use rial_rate_analyzer::ingest::process_batch;
use rial_rate_analyzer::store::{
    ArticleRecord, ArticleStore, SentimentLabel, SqliteStore, StoreError,
};

fn today() -> NaiveDate {
    "2025-03-31".parse().unwrap()
}

fn titled(title: &str, content: Option<&str>) -> RawArticle {
    RawArticle {
        title: Some(title.to_string()),
        content: content.map(str::to_string),
        ..Default::default()
    }
}

/// Counts invocations; scores everything strongly positive.
struct CountingClassifier(AtomicUsize);

#[async_trait]
impl SentimentClassifier for CountingClassifier {
    async fn score(&self, _text: &str) -> Result<f64, ClassifyError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(0.9)
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Fails on selected texts, succeeds on the rest.
struct FlakyClassifier;

#[async_trait]
impl SentimentClassifier for FlakyClassifier {
    async fn score(&self, text: &str) -> Result<f64, ClassifyError> {
        if text.contains("poison") {
            Err(ClassifyError::MalformedResponse)
        } else {
            Ok(-0.9)
        }
    }
    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Article store whose writes always fail.
struct BrokenStore;

#[async_trait]
impl ArticleStore for BrokenStore {
    async fn insert(&self, _article: ArticleRecord) -> Result<(), StoreError> {
        Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
    }
    async fn labels_in_range(&self, _range: DateRange) -> Result<Vec<SentimentLabel>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn one_failure_never_aborts_the_batch() {
    let store = SqliteStore::open_in_memory().unwrap();
    let batch = vec![
        titled("good one", Some("markets fell sharply")),
        titled("bad one", Some("poison payload")),
        titled("good two", Some("markets fell again")),
    ];

    let out = process_batch(
        batch,
        Arc::new(FlakyClassifier),
        Arc::new(store.clone()),
        LabelThresholds::default(),
        today(),
    )
    .await;

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].sentiment, SentimentLabel::Negative);
    assert_eq!(out[1].sentiment, SentimentLabel::Error);
    assert_eq!(out[2].sentiment, SentimentLabel::Negative);

    // The degraded article is still recorded.
    let labels = store
        .labels_in_range(DateRange {
            from: today(),
            to: today(),
        })
        .await
        .unwrap();
    assert_eq!(labels.len(), 3);
    assert_eq!(
        labels
            .iter()
            .filter(|l| **l == SentimentLabel::Error)
            .count(),
        1
    );
}

#[tokio::test]
async fn empty_text_skips_the_classifier_entirely() {
    let store = SqliteStore::open_in_memory().unwrap();
    let classifier = Arc::new(CountingClassifier(AtomicUsize::new(0)));
    let batch = vec![
        titled("has text", Some("something to say")),
        titled("no text at all", None),
        RawArticle {
            title: Some("blank content falls back to description".to_string()),
            content: Some("   ".to_string()),
            description: Some("a description".to_string()),
            ..Default::default()
        },
    ];

    let out = process_batch(
        batch,
        classifier.clone(),
        Arc::new(store),
        LabelThresholds::default(),
        today(),
    )
    .await;

    assert_eq!(out[0].sentiment, SentimentLabel::Positive);
    assert_eq!(out[1].sentiment, SentimentLabel::Neutral);
    assert_eq!(out[2].sentiment, SentimentLabel::Positive);
    // Exactly two articles had text worth classifying.
    assert_eq!(classifier.0.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistence_failure_is_not_fatal() {
    let batch = vec![
        titled("a", Some("some text")),
        titled("b", Some("more text")),
    ];

    let out = process_batch(
        batch,
        Arc::new(CountingClassifier(AtomicUsize::new(0))),
        Arc::new(BrokenStore),
        LabelThresholds::default(),
        today(),
    )
    .await;

    // Writes failed, but the caller still gets the full processed batch.
    assert_eq!(out.len(), 2);
    assert!(out
        .iter()
        .all(|a| a.sentiment == SentimentLabel::Positive));
}

#[tokio::test]
async fn response_preserves_feed_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    let batch: Vec<RawArticle> = (0..25)
        .map(|i| titled(&format!("article {i:02}"), Some("text")))
        .collect();

    let out = process_batch(
        batch,
        Arc::new(CountingClassifier(AtomicUsize::new(0))),
        Arc::new(store),
        LabelThresholds::default(),
        today(),
    )
    .await;

    let titles: Vec<&str> = out.iter().map(|a| a.title.as_str()).collect();
    let expected: Vec<String> = (0..25).map(|i| format!("article {i:02}")).collect();
    assert_eq!(titles, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn missing_fields_get_documented_defaults() {
    let store = SqliteStore::open_in_memory().unwrap();
    let out = process_batch(
        vec![RawArticle::default()],
        Arc::new(CountingClassifier(AtomicUsize::new(0))),
        Arc::new(store),
        LabelThresholds::default(),
        today(),
    )
    .await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "");
    assert_eq!(out[0].url, "#");
    assert_eq!(out[0].published_at, today());
    assert_eq!(out[0].sentiment, SentimentLabel::Neutral);
}
