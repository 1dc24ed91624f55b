//! # Error taxonomy
//! Typed failures for the aggregation/prediction pipeline, mapped to the
//! structured `{ "error": "<message>" }` payloads the UI consumes.
//!
//! Policy: aggregate-level failures (no rate data, unreachable upstream) are
//! fatal to the request. Item-level failures inside a news batch never reach
//! this type; they are contained per article and downgraded to an `error`
//! sentiment label.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::feeds::FeedError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required aggregate window matched zero rows.
    #[error("No {0} data available")]
    NoData(&'static str),

    /// An external feed or the classifier failed on a single-resource path.
    #[error(transparent)]
    Upstream(#[from] FeedError),

    /// A read or write against the store failed.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NoData(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_message_names_the_series() {
        let e = ApiError::NoData("exchange rate");
        assert_eq!(e.to_string(), "No exchange rate data available");
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_maps_to_bad_gateway() {
        let e = ApiError::Upstream(FeedError::Rejected("invalid access key".into()));
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
    }
}
