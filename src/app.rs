use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::config::ClientConfig;
use crate::models::analysis::EmotionAnalysis;
use crate::models::history::HistoryEntry;
use crate::models::streak::{StreakState, StreakUpdate};
use crate::services::analysis::{validate_text, AnalysisError, AnalysisService};
use crate::services::RemoteAnalyzer;
use crate::store::{FileStore, KeyValueStore};
use crate::tracker::{HistoryCache, StreakTracker, TrendAggregator, TrendReport};

/// Result of one "analyze" action.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub analysis: EmotionAnalysis,
    /// The entry as saved to history.
    pub entry: HistoryEntry,
    pub streak: StreakUpdate,
    /// Show the streak celebration.
    pub celebrate: bool,
}

/// The local components wired together for a UI shell.
pub struct MoodMirror {
    history: HistoryCache,
    streak: StreakTracker,
    trends: TrendAggregator,
    analyzer: Arc<dyn AnalysisService>,
}

impl MoodMirror {
    pub fn new(store: Arc<dyn KeyValueStore>, analyzer: Arc<dyn AnalysisService>) -> Self {
        Self {
            history: HistoryCache::new(store.clone()),
            streak: StreakTracker::new(store),
            trends: TrendAggregator::default(),
            analyzer,
        }
    }

    /// File-backed state under `data_dir`, analysis through the companion server.
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        let analyzer = Arc::new(RemoteAnalyzer::new(
            config.http_client()?,
            config.api_base_url.clone(),
        ));
        Ok(Self::new(store, analyzer))
    }

    /// Use `trends` (for example one with the user's UTC offset) for reports.
    pub fn with_trends(mut self, trends: TrendAggregator) -> Self {
        self.trends = trends;
        self
    }

    /// Analyze `text`, record it in history and advance the streak for `today`.
    ///
    /// Blank or oversized text is rejected before the analyzer is called.
    /// Nothing is recorded when the analysis fails.
    pub async fn analyze(&self, text: &str, today: NaiveDate) -> Result<AnalyzeOutcome, AnalysisError> {
        let text = text.trim();
        validate_text(text)?;
        let analysis = self.analyzer.analyze(text).await?;

        let entry = HistoryEntry::new(text, analysis.clone(), Utc::now());
        self.history.save(entry.clone());

        let streak = self.streak.update(today);
        let celebrate = streak.is_new_streak && streak.streak > 1;

        Ok(AnalyzeOutcome {
            analysis,
            entry,
            streak,
            celebrate,
        })
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.list()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    pub fn streak(&self) -> StreakState {
        self.streak.current()
    }

    pub fn trends(&self) -> TrendReport {
        self.trends.report(&self.history.list())
    }
}
