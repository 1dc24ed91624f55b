//! # Store
//! Embedded SQLite persistence for rate samples and article records.
//!
//! Two tables: `exchange_rates` keyed uniquely by date (same-date ingestion
//! overwrites), and `news_articles`, append-only. The store traits are async
//! so callers can compose reads with `tokio::join!` without caring about the
//! backend; the SQLite implementation serializes access behind a mutex.

pub mod articles;
pub mod rates;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

pub use articles::{ArticleRecord, ArticleStore, SentimentLabel};
pub use rates::{RateSample, RateStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid stored date: {0}")]
    BadDate(#[from] chrono::ParseError),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS exchange_rates (
    date TEXT PRIMARY KEY,
    rate REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS news_articles (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    source       TEXT NOT NULL DEFAULT 'Unknown',
    published_at TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    sentiment    TEXT NOT NULL,
    url          TEXT NOT NULL DEFAULT ''
);
";

/// Single-connection SQLite store. Cloning shares the connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("sqlite mutex poisoned")
    }
}
