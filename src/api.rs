//! # HTTP API
//! Router and handlers. All collaborators are injected through `AppState`
//! trait objects so tests can substitute fakes; every request recomputes
//! its aggregates from durable storage.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::classify::SentimentClassifier;
use crate::clock::{Clock, DateRange};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::feeds::{NewsFeed, RateFeed};
use crate::ingest::{self, ProcessedArticle};
use crate::predict;
use crate::series::{self, ChartData};
use crate::store::{ArticleStore, RateSample, RateStore};

#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<dyn RateStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub classifier: Arc<dyn SentimentClassifier>,
    pub rate_feed: Arc<dyn RateFeed>,
    pub news_feed: Arc<dyn NewsFeed>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/currentRate", get(current_rate))
        .route("/api/week", get(week_series))
        .route("/api/30days", get(month_series))
        .route("/api/90days", get(quarter_series))
        .route("/api/news", get(news))
        .route("/api/prediction", get(prediction))
        .route("/api/updateRate", get(update_rate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct CurrentRateResp {
    #[serde(rename = "currentRate")]
    current_rate: String,
}

async fn current_rate(State(state): State<AppState>) -> Result<Json<CurrentRateResp>, ApiError> {
    let current_rate = match state.rates.latest().await? {
        Some(sample) => format!("{} IRR per USD", sample.rate),
        None => "No Data".to_string(),
    };
    Ok(Json(CurrentRateResp { current_rate }))
}

async fn week_series(State(state): State<AppState>) -> Result<Json<ChartData>, ApiError> {
    window_series(&state, 7).await
}

async fn month_series(State(state): State<AppState>) -> Result<Json<ChartData>, ApiError> {
    window_series(&state, 30).await
}

async fn quarter_series(State(state): State<AppState>) -> Result<Json<ChartData>, ApiError> {
    window_series(&state, 90).await
}

async fn window_series(state: &AppState, days: i64) -> Result<Json<ChartData>, ApiError> {
    let range = DateRange::ending_yesterday(state.clock.today(), days);
    let samples = state.rates.in_range(range).await?;
    Ok(Json(series::chart_data(samples)))
}

#[derive(Serialize)]
struct NewsResp {
    articles: Vec<ProcessedArticle>,
}

async fn news(State(state): State<AppState>) -> Result<Json<NewsResp>, ApiError> {
    let today = state.clock.today();
    let range = DateRange {
        from: one_month_before(today),
        to: today,
    };

    let raw = state.news_feed.fetch_recent(range).await?;
    let articles = ingest::process_batch(
        raw,
        state.classifier.clone(),
        state.articles.clone(),
        state.config.classifier.thresholds,
        today,
    )
    .await;

    Ok(Json(NewsResp { articles }))
}

fn one_month_before(day: NaiveDate) -> NaiveDate {
    day.checked_sub_months(Months::new(1)).unwrap_or(day)
}

#[derive(Serialize)]
struct PredictionResp {
    #[serde(rename = "tomorrowsPrediction")]
    tomorrows_prediction: String,
    confidence: String,
}

async fn prediction(State(state): State<AppState>) -> Result<Json<PredictionResp>, ApiError> {
    let forecast = predict::tomorrow(
        state.rates.as_ref(),
        state.articles.as_ref(),
        state.clock.today(),
        &state.config.prediction,
    )
    .await?;

    Ok(Json(PredictionResp {
        tomorrows_prediction: format!("{:.2} IRR", forecast.predicted_rate),
        confidence: format!("{:.2}", forecast.confidence),
    }))
}

#[derive(Serialize)]
struct UpdateRateResp {
    message: String,
    date: NaiveDate,
    rate: f64,
}

async fn update_rate(State(state): State<AppState>) -> Result<Json<UpdateRateResp>, ApiError> {
    let rate = state.rate_feed.latest_usd_irr().await?;
    // The feed quotes the previous trading day.
    let date = state.clock.today() - Duration::days(1);

    state.rates.upsert(RateSample { date, rate }).await?;

    Ok(Json(UpdateRateResp {
        message: "Exchange rate updated".to_string(),
        date,
        rate,
    }))
}
