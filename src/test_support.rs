//! Shared fixtures and fakes for unit tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::connect_info::MockConnectInfo;
use axum::Router;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use http_body_util::BodyExt;

use crate::auth::jwt::create_access_token;
use crate::config::Config;
use crate::db::MemoryJournalRepository;
use crate::models::analysis::{EmotionAnalysis, OverallTone, PrimaryEmotion};
use crate::models::history::HistoryEntry;
use crate::models::journal::{JournalEntry, JournalWrite};
use crate::routes::build_router;
use crate::services::analysis::{AnalysisError, AnalysisService};
use crate::store::{KeyValueStore, MemoryStore, StorageError};
use crate::tracker::journal_store::{JournalBackend, JournalError};
use crate::AppState;

// ============================================================================
// Model fixtures
// ============================================================================

pub fn analysis(tone: OverallTone) -> EmotionAnalysis {
    EmotionAnalysis {
        overall_tone: tone,
        primary_emotions: vec![
            PrimaryEmotion {
                emotion: "contentment".into(),
                percentage: 60.0,
            },
            PrimaryEmotion {
                emotion: "relief".into(),
                percentage: 40.0,
            },
        ],
        cause_explanation: "A steady day.".into(),
        suggestion: "Keep going.".into(),
        timestamp: at(2024, 1, 1),
    }
}

/// 20:00 UTC on the given day.
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 20, 0, 0).unwrap()
}

pub fn entry_at(text: &str, tone: OverallTone, y: i32, m: u32, d: u32) -> HistoryEntry {
    HistoryEntry::new(text, analysis(tone), at(y, m, d))
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ============================================================================
// Key-value store fakes
// ============================================================================

/// Memory store whose reads or writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove(key)
    }
}

// ============================================================================
// Journal backend fake
// ============================================================================

#[derive(Default)]
pub struct FakeJournalBackend {
    entries: Mutex<HashMap<(String, NaiveDate), JournalEntry>>,
    offline: AtomicBool,
    fail_next_list: AtomicBool,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl FakeJournalBackend {
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_list(&self) {
        self.fail_next_list.store(true, Ordering::SeqCst);
    }

    /// Write that bypasses the store, as another device would.
    pub fn insert_direct(&self, user_id: &str, date: NaiveDate, text: &str) {
        let entry = JournalEntry {
            date,
            text: text.into(),
            analysis: None,
            notes: None,
            updated_at: Utc::now(),
        };
        self.entries
            .lock()
            .unwrap()
            .insert((user_id.to_string(), date), entry);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    fn reachable(&self) -> Result<(), JournalError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(JournalError::Connectivity("network unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl JournalBackend for FakeJournalBackend {
    async fn list_all(&self, user_id: &str) -> Result<Vec<JournalEntry>, JournalError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable()?;
        if self.fail_next_list.swap(false, Ordering::SeqCst) {
            return Err(JournalError::Connectivity("connection reset".into()));
        }

        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|((owner, _), _)| owner == user_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn get(&self, user_id: &str, date: NaiveDate) -> Result<JournalEntry, JournalError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable()?;

        self.entries
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), date))
            .cloned()
            .ok_or(JournalError::NotFound(date))
    }

    async fn upsert(&self, user_id: &str, write: &JournalWrite) -> Result<JournalEntry, JournalError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable()?;

        let entry = write.clone().into_entry(Utc::now());
        self.entries
            .lock()
            .unwrap()
            .insert((user_id.to_string(), write.date), entry.clone());
        Ok(entry)
    }
}

// ============================================================================
// Analyzer fake
// ============================================================================

enum Script {
    Returning(EmotionAnalysis),
    Offline,
    Upstream(u16),
}

pub struct ScriptedAnalyzer {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn returning(analysis: EmotionAnalysis) -> Self {
        Self::with(Script::Returning(analysis))
    }

    /// Fails as if the service were unreachable.
    pub fn failing() -> Self {
        Self::with(Script::Offline)
    }

    pub fn failing_upstream(status: u16) -> Self {
        Self::with(Script::Upstream(status))
    }

    fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisService for ScriptedAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<EmotionAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Returning(analysis) => Ok(analysis.clone()),
            Script::Offline => Err(AnalysisError::Connectivity("connection refused".into())),
            Script::Upstream(status) => Err(AnalysisError::Upstream {
                status: Some(*status),
                message: "scripted failure".into(),
            }),
        }
    }
}

// ============================================================================
// Server fixtures
// ============================================================================

pub fn test_config() -> Config {
    Config {
        database_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:5173".into(),
        cors_extra_origins: Vec::new(),
        jwt_secret: "test-secret".into(),
        openai_api_key: None,
        openai_model: "gpt-3.5-turbo".into(),
        openai_base_url: "http://127.0.0.1:9/v1".into(),
        analyze_rate_limit_max: 10,
        analyze_rate_limit_window_secs: 900,
    }
}

pub fn test_state(analyzer: Option<Arc<dyn AnalysisService>>) -> AppState {
    AppState::new(
        Arc::new(MemoryJournalRepository::new()),
        analyzer,
        Arc::new(test_config()),
    )
}

/// Router with a fixed client address, for `oneshot` tests.
pub fn test_app(state: AppState) -> Router {
    build_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

/// `Authorization` header value for `user_id`, signed with the test secret.
pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", create_access_token(user_id, 600, &test_config()))
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve the real router on an ephemeral port; returns the `/api` base URL.
pub async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    format!("http://{}/api", addr)
}
