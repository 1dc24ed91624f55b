//! # External feeds
//! Upstream collaborators supplying the authoritative daily rate and recent
//! news articles. Providers are trait objects so tests can substitute fakes;
//! the HTTP implementations share one client with connect/total timeouts so
//! a misbehaving upstream cannot suspend a request unboundedly.

pub mod fixer;
pub mod newsapi;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clock::DateRange;

pub use fixer::FixerFeed;
pub use newsapi::NewsApiFeed;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    /// The upstream answered but refused the request (bad key, quota, ...).
    #[error("upstream rejected the request: {0}")]
    Rejected(String),

    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

/// One article as delivered by the news feed, prior to classification.
/// Every field is optional; ingestion fills defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArticle {
    pub title: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Latest authoritative USD→IRR rate.
    async fn latest_usd_irr(&self) -> Result<f64, FeedError>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Recent articles for the configured query topic, newest first.
    async fn fetch_recent(&self, range: DateRange) -> Result<Vec<RawArticle>, FeedError>;
    fn name(&self) -> &'static str;
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("rial-rate-analyzer/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
}
