//! # Configuration
//! TOML app config with built-in defaults. Resolution order:
//! `$APP_CONFIG_PATH` → `config/app.toml` → defaults. Secrets (API keys)
//! come from the environment only and never live in the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::classify::LabelThresholds;
use crate::predict::PredictionTuning;

pub const ENV_CONFIG_PATH: &str = "APP_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
const ENV_FIXER_API_KEY: &str = "FIXER_API_KEY";
const ENV_GOOGLE_NL_API_KEY: &str = "GOOGLE_NL_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub news: NewsConfig,
    pub rate_feed: RateFeedConfig,
    pub classifier: ClassifierConfig,
    pub prediction: PredictionTuning,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/rates.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    /// Fixed query topic for the news feed.
    pub query: String,
    pub language: String,
    pub page_size: u32,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            query: "Iran AND Trump".to_string(),
            language: "en".to_string(),
            page_size: 100,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateFeedConfig {
    pub base_url: String,
    #[serde(skip)]
    pub access_key: String,
}

impl Default for RateFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://data.fixer.io/api".to_string(),
            access_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub thresholds: LabelThresholds,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "https://language.googleapis.com".to_string(),
            thresholds: LabelThresholds::default(),
            api_key: String::new(),
        }
    }
}

impl AppConfig {
    /// Load config using env path override + fallbacks, then apply
    /// environment secrets and the `PORT` override.
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            Self::from_file(Path::new(&p))?
        } else {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::from_file(default)?
            } else {
                Self::default()
            }
        };

        cfg.news.api_key = std::env::var(ENV_NEWS_API_KEY).unwrap_or_default();
        cfg.rate_feed.access_key = std::env::var(ENV_FIXER_API_KEY).unwrap_or_default();
        cfg.classifier.api_key = std::env::var(ENV_GOOGLE_NL_API_KEY).unwrap_or_default();

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                cfg.server.port = port;
            }
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config from {}", path.display()))
    }
}
