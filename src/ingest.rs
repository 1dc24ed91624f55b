//! # Article ingestion
//! Classifies a batch of fetched articles and persists every one of them.
//!
//! Bulkhead semantics: per-article work is isolated, so one classifier
//! timeout or malformed article never cancels its siblings. The batch waits
//! for all articles before the response is assembled. Persistence failures
//! are logged and counted, never fatal.

use std::sync::Arc;

use chrono::NaiveDate;
use metrics::{counter, describe_counter};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::classify::{label_for_score, LabelThresholds, SentimentClassifier};
use crate::feeds::RawArticle;
use crate::store::{ArticleRecord, ArticleStore, SentimentLabel};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "articles_processed_total",
            "Articles classified and recorded per ingest batch."
        );
        describe_counter!(
            "classifier_errors_total",
            "Per-article classification failures downgraded to an error label."
        );
        describe_counter!(
            "article_persist_errors_total",
            "Article store write failures (non-fatal)."
        );
    });
}

/// The per-article projection returned to the caller of `/api/news`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedArticle {
    pub title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: NaiveDate,
    pub sentiment: SentimentLabel,
    pub description: String,
    pub url: String,
}

impl From<&ArticleRecord> for ProcessedArticle {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            title: record.title.clone(),
            published_at: record.published_at,
            sentiment: record.sentiment,
            description: record.description.clone(),
            url: record.url.clone(),
        }
    }
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize article text before classification: HTML entity decode, tag
/// strip, whitespace collapse, 1500-char cap.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();
    out = RE_TAGS.replace_all(&out, "").to_string();
    out = RE_WS.replace_all(&out, " ").trim().to_string();
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}

/// Classify one article into a record. Never fails: classifier errors
/// degrade to the `error` label and empty text is recorded as neutral.
async fn classify_one(
    article: RawArticle,
    classifier: Arc<dyn SentimentClassifier>,
    thresholds: LabelThresholds,
    fallback_date: NaiveDate,
) -> ArticleRecord {
    let title = article.title.unwrap_or_default();
    let source = article.source.unwrap_or_else(|| "Unknown".to_string());
    let description = article.description.clone().unwrap_or_default();
    let url = article.url.unwrap_or_else(|| "#".to_string());
    let published_at = article
        .published_at
        .map(|t| t.date_naive())
        .unwrap_or(fallback_date);

    let text = normalize_text(
        article
            .content
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(article.description.as_deref())
            .unwrap_or(""),
    );

    let sentiment = if text.is_empty() {
        // Nothing to analyze. Recorded as neutral, not as a failure.
        tracing::debug!(title = %title, "no content to analyze");
        SentimentLabel::Neutral
    } else {
        match classifier.score(&text).await {
            Ok(score) => label_for_score(score, &thresholds),
            Err(e) => {
                tracing::warn!(error = %e, title = %title, "classification failed");
                counter!("classifier_errors_total").increment(1);
                SentimentLabel::Error
            }
        }
    };

    ArticleRecord {
        title,
        source,
        published_at,
        description,
        sentiment,
        url,
    }
}

/// Run the batch: classify every article concurrently, persist each record,
/// and return the projections in feed order.
pub async fn process_batch(
    articles: Vec<RawArticle>,
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn ArticleStore>,
    thresholds: LabelThresholds,
    fallback_date: NaiveDate,
) -> Vec<ProcessedArticle> {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for (idx, article) in articles.into_iter().enumerate() {
        let classifier = classifier.clone();
        let store = store.clone();
        set.spawn(async move {
            let record = classify_one(article, classifier, thresholds, fallback_date).await;

            if let Err(e) = store.insert(record.clone()).await {
                tracing::warn!(error = %e, title = %record.title, "article insert failed");
                counter!("article_persist_errors_total").increment(1);
            }
            counter!("articles_processed_total").increment(1);

            (idx, record)
        });
    }

    let mut processed: Vec<(usize, ArticleRecord)> = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(pair) => processed.push(pair),
            // A panicked task loses its slot; the rest of the batch stands.
            Err(e) => tracing::error!(error = %e, "article task failed"),
        }
    }
    processed.sort_by_key(|(idx, _)| *idx);

    processed
        .iter()
        .map(|(_, record)| ProcessedArticle::from(record))
        .collect()
}
