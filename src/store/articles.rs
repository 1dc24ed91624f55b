//! Classified news articles. Append-only; duplicate articles across
//! ingestion runs are possible and accepted.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{SqliteStore, StoreError};
use crate::clock::DateRange;

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    /// Classification failed for this article, but it was still recorded.
    Error,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Error => "error",
        }
    }

    /// Labels unknown to this version are treated like `error`: recorded but
    /// excluded from aggregation.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "positive" => SentimentLabel::Positive,
            "neutral" => SentimentLabel::Neutral,
            "negative" => SentimentLabel::Negative,
            _ => SentimentLabel::Error,
        }
    }

    /// Aggregation score. `None` for `error` rows, which participate in
    /// neither the sum nor the count.
    pub fn score(self) -> Option<i32> {
        match self {
            SentimentLabel::Positive => Some(1),
            SentimentLabel::Neutral => Some(0),
            SentimentLabel::Negative => Some(-1),
            SentimentLabel::Error => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub source: String,
    pub published_at: NaiveDate,
    pub description: String,
    pub sentiment: SentimentLabel,
    pub url: String,
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Append one record. Never updates or deletes existing rows.
    async fn insert(&self, article: ArticleRecord) -> Result<(), StoreError>;

    /// Sentiment labels of all articles published inside the window.
    async fn labels_in_range(&self, range: DateRange) -> Result<Vec<SentimentLabel>, StoreError>;
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn insert(&self, article: ArticleRecord) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO news_articles (title, source, published_at, description, sentiment, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                article.title,
                article.source,
                article.published_at.format(DATE_FMT).to_string(),
                article.description,
                article.sentiment.as_str(),
                article.url,
            ],
        )?;
        Ok(())
    }

    async fn labels_in_range(&self, range: DateRange) -> Result<Vec<SentimentLabel>, StoreError> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT sentiment FROM news_articles WHERE published_at BETWEEN ?1 AND ?2")?;
        let mapped = stmt.query_map(
            params![
                range.from.format(DATE_FMT).to_string(),
                range.to.format(DATE_FMT).to_string()
            ],
            |row| row.get::<_, String>(0),
        )?;

        let mut out = Vec::new();
        for row in mapped {
            out.push(SentimentLabel::parse_lossy(&row?));
        }
        Ok(out)
    }
}
