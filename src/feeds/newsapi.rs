//! NewsAPI `everything` provider for the configured query topic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use super::{http_client, FeedError, NewsFeed, RawArticle};
use crate::clock::DateRange;
use crate::config::NewsConfig;

#[derive(Debug, Deserialize)]
struct Everything {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
struct WireArticle {
    #[serde(default)]
    source: Option<WireSource>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<DateTime<Utc>>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSource {
    name: Option<String>,
}

/// Parse an `everything` payload into feed-neutral articles.
pub fn parse_everything(body: &str) -> Result<Vec<RawArticle>, FeedError> {
    let wire: Everything =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    if wire.status != "ok" {
        let message = wire
            .message
            .unwrap_or_else(|| format!("status {}", wire.status));
        return Err(FeedError::Rejected(message));
    }

    Ok(wire
        .articles
        .into_iter()
        .map(|a| RawArticle {
            title: a.title,
            source: a.source.and_then(|s| s.name),
            published_at: a.published_at,
            description: a.description,
            content: a.content,
            url: a.url,
        })
        .collect())
}

pub struct NewsApiFeed {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    query: String,
    language: String,
    page_size: u32,
}

impl NewsApiFeed {
    pub fn new(cfg: &NewsConfig) -> Self {
        Self {
            http: http_client(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            query: cfg.query.clone(),
            language: cfg.language.clone(),
            page_size: cfg.page_size,
        }
    }
}

#[async_trait]
impl NewsFeed for NewsApiFeed {
    async fn fetch_recent(&self, range: DateRange) -> Result<Vec<RawArticle>, FeedError> {
        let url = format!("{}/v2/everything", self.base_url);
        let from = range.from.to_string();
        let to = range.to.to_string();
        let page_size = self.page_size.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", self.query.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
                ("language", self.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!(error = ?e, provider = "newsapi", "news feed http error");
                counter!("feed_errors_total").increment(1);
            })?;

        if !resp.status().is_success() {
            counter!("feed_errors_total").increment(1);
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        parse_everything(&body).inspect_err(|e| {
            tracing::warn!(error = %e, provider = "newsapi", "news feed payload error");
            counter!("feed_errors_total").increment(1);
        })
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
