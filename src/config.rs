use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

/// Companion server settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL; without one the server keeps journals in memory.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,

    pub analyze_rate_limit_max: u32,
    pub analyze_rate_limit_window_secs: u64,
}

/// Settings for an embedding client (UI shell, CLI, tests).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret =
            non_empty(lookup("JWT_SECRET")).ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        Ok(Self {
            database_url: non_empty(lookup("DATABASE_URL")),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3001)?,
            frontend_url: lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:5173".into()),
            cors_extra_origins: lookup("CORS_EXTRA_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret,

            openai_api_key: non_empty(lookup("OPENAI_API_KEY")),
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".into()),
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),

            analyze_rate_limit_max: parse_or(&lookup, "ANALYZE_RATE_LIMIT_MAX", 10)?,
            analyze_rate_limit_window_secs: parse_or(&lookup, "ANALYZE_RATE_LIMIT_WINDOW_SECS", 900)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: lookup("MOODMIRROR_API_URL")
                .unwrap_or_else(|| "http://localhost:3001/api".into()),
            data_dir: lookup("MOODMIRROR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".moodmirror")),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "MOODMIRROR_REQUEST_TIMEOUT_SECS",
                30u64,
            )?),
        })
    }

    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")
    }
}
