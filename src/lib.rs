//! MoodMirror: client-side state for emotion analysis (recent history,
//! daily streak, journal calendar, mood trends) plus the companion API
//! server that analyzes text and stores journals.

use std::sync::Arc;

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;

use auth::rate_limit::RateLimitState;
use config::Config;
use db::JournalRepository;
use services::AnalysisService;

pub use app::{AnalyzeOutcome, MoodMirror};

#[derive(Clone)]
pub struct AppState {
    pub journal: Arc<dyn JournalRepository>,
    /// `None` when no analysis provider is configured.
    pub analyzer: Option<Arc<dyn AnalysisService>>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(
        journal: Arc<dyn JournalRepository>,
        analyzer: Option<Arc<dyn AnalysisService>>,
        config: Arc<Config>,
    ) -> Self {
        let rate_limiter = RateLimitState::new(
            config.analyze_rate_limit_max,
            config.analyze_rate_limit_window_secs,
        );
        Self {
            journal,
            analyzer,
            config,
            rate_limiter,
        }
    }
}
