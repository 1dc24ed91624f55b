//! fixer.io latest-rates provider. Quotes are EUR-based, so the USD→IRR
//! rate is derived as the IRR/USD cross.

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use super::{http_client, FeedError, RateFeed};
use crate::config::RateFeedConfig;

#[derive(Debug, Deserialize)]
struct LatestResp {
    success: bool,
    #[serde(default)]
    rates: Option<Rates>,
    #[serde(default)]
    error: Option<ApiErr>,
}

#[derive(Debug, Deserialize)]
struct Rates {
    #[serde(rename = "USD")]
    usd: Option<f64>,
    #[serde(rename = "IRR")]
    irr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErr {
    #[serde(default)]
    info: Option<String>,
}

/// Derive the USD→IRR cross from a `latest` payload.
pub fn parse_latest(body: &str) -> Result<f64, FeedError> {
    let resp: LatestResp =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    if !resp.success {
        let info = resp
            .error
            .and_then(|e| e.info)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(FeedError::Rejected(info));
    }

    let rates = resp
        .rates
        .ok_or_else(|| FeedError::Malformed("missing rates object".into()))?;
    let usd = rates
        .usd
        .ok_or_else(|| FeedError::Malformed("missing USD quote".into()))?;
    let irr = rates
        .irr
        .ok_or_else(|| FeedError::Malformed("missing IRR quote".into()))?;
    if usd <= 0.0 {
        return Err(FeedError::Malformed(format!("non-positive USD quote {usd}")));
    }
    Ok(irr / usd)
}

pub struct FixerFeed {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl FixerFeed {
    pub fn new(cfg: &RateFeedConfig) -> Self {
        Self {
            http: http_client(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            access_key: cfg.access_key.clone(),
        }
    }
}

#[async_trait]
impl RateFeed for FixerFeed {
    async fn latest_usd_irr(&self) -> Result<f64, FeedError> {
        let url = format!("{}/latest", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("access_key", self.access_key.as_str()), ("symbols", "USD,IRR")])
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!(error = ?e, provider = "fixer", "rate feed http error");
                counter!("feed_errors_total").increment(1);
            })?;

        if !resp.status().is_success() {
            counter!("feed_errors_total").increment(1);
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        parse_latest(&body).inspect_err(|e| {
            tracing::warn!(error = %e, provider = "fixer", "rate feed payload error");
            counter!("feed_errors_total").increment(1);
        })
    }

    fn name(&self) -> &'static str {
        "fixer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_rate_from_eur_based_quotes() {
        let body = r#"{"success":true,"base":"EUR","rates":{"USD":1.08,"IRR":45360.0}}"#;
        let rate = parse_latest(body).unwrap();
        assert!((rate - 42_000.0).abs() < 1e-6);
    }

    #[test]
    fn rejection_carries_upstream_info() {
        let body = r#"{"success":false,"error":{"code":101,"info":"invalid access key"}}"#;
        match parse_latest(body) {
            Err(FeedError::Rejected(info)) => assert_eq!(info, "invalid access key"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn missing_symbol_is_malformed() {
        let body = r#"{"success":true,"rates":{"USD":1.08}}"#;
        assert!(matches!(parse_latest(body), Err(FeedError::Malformed(_))));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(parse_latest("not json"), Err(FeedError::Malformed(_))));
    }
}
