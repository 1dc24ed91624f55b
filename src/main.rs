//! Rate & Sentiment Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the store, feed clients, and routes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rial_rate_analyzer::api::{create_router, AppState};
use rial_rate_analyzer::classify::GoogleNlClassifier;
use rial_rate_analyzer::clock::SystemClock;
use rial_rate_analyzer::config::AppConfig;
use rial_rate_analyzer::feeds::{FixerFeed, NewsApiFeed};
use rial_rate_analyzer::metrics::Metrics;
use rial_rate_analyzer::store::SqliteStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rial_rate_analyzer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::load()?;

    if let Some(dir) = config.database.path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating database dir {}", dir.display()))?;
        }
    }
    let store = SqliteStore::open(&config.database.path).context("opening sqlite store")?;

    let metrics = Metrics::init(config.prediction.sensitivity);

    let state = AppState {
        rates: Arc::new(store.clone()),
        articles: Arc::new(store),
        classifier: Arc::new(GoogleNlClassifier::new(&config.classifier)),
        rate_feed: Arc::new(FixerFeed::new(&config.rate_feed)),
        news_feed: Arc::new(NewsApiFeed::new(&config.news)),
        clock: Arc::new(SystemClock),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state).merge(metrics.router());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
