//! # Sentiment classifier
//! Remote document-sentiment scoring behind a trait object, plus the
//! threshold mapping from a polarity score to a stored label.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClassifierConfig;
use crate::store::SentimentLabel;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {0}")]
    Status(u16),

    #[error("classifier response missing document sentiment")]
    MalformedResponse,
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Document-level polarity in roughly [-1, 1].
    async fn score(&self, text: &str) -> Result<f64, ClassifyError>;
    fn name(&self) -> &'static str;
}

/// Score cut-offs for the three stored polarity labels.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            positive: 0.2,
            negative: -0.2,
        }
    }
}

/// `score > positive` → positive, `score < negative` → negative, else neutral.
pub fn label_for_score(score: f64, thresholds: &LabelThresholds) -> SentimentLabel {
    if score > thresholds.positive {
        SentimentLabel::Positive
    } else if score < thresholds.negative {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Google Cloud Natural Language `analyzeSentiment` REST client.
pub struct GoogleNlClassifier {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleNlClassifier {
    pub fn new(cfg: &ClassifierConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("rial-rate-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeReq<'a> {
    document: Document<'a>,
    encoding_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    #[serde(rename = "type")]
    doc_type: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResp {
    document_sentiment: Option<DocumentSentiment>,
}

#[derive(Deserialize)]
struct DocumentSentiment {
    score: Option<f64>,
}

#[async_trait]
impl SentimentClassifier for GoogleNlClassifier {
    async fn score(&self, text: &str) -> Result<f64, ClassifyError> {
        let url = format!("{}/v1/documents:analyzeSentiment", self.base_url);
        let req = AnalyzeReq {
            document: Document {
                doc_type: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClassifyError::Status(resp.status().as_u16()));
        }

        let body: AnalyzeResp = resp.json().await?;
        body.document_sentiment
            .and_then(|s| s.score)
            .ok_or(ClassifyError::MalformedResponse)
    }

    fn name(&self) -> &'static str {
        "google-nl"
    }
}

/// Deterministic classifier for tests and local runs.
pub struct FixedClassifier(pub f64);

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    async fn score(&self, _text: &str) -> Result<f64, ClassifyError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
