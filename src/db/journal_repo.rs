use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::analysis::EmotionAnalysis;
use crate::models::journal::{JournalEntry, JournalWrite};

/// Server-side journal persistence, one row per `(user, date)`.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// All of a user's entries, newest date first.
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<JournalEntry>>;

    async fn get(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<JournalEntry>>;

    /// Insert or replace the entry for `write.date`, stamping `updated_at`.
    async fn upsert(&self, user_id: &str, write: JournalWrite) -> AppResult<JournalEntry>;

    async fn ping(&self) -> bool;
}

// ============================================================================
// Postgres
// ============================================================================

#[derive(Debug, FromRow)]
struct JournalRow {
    entry_date: NaiveDate,
    text: String,
    notes: Option<String>,
    analysis: Option<Json<EmotionAnalysis>>,
    updated_at: DateTime<Utc>,
}

impl From<JournalRow> for JournalEntry {
    fn from(row: JournalRow) -> Self {
        JournalEntry {
            date: row.entry_date,
            text: row.text,
            analysis: row.analysis.map(|Json(a)| a),
            notes: row.notes,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgJournalRepository {
    db: PgPool,
}

impl PgJournalRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JournalRepository for PgJournalRepository {
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<JournalEntry>> {
        let rows = sqlx::query_as::<_, JournalRow>(
            r#"
            SELECT entry_date, text, notes, analysis, updated_at
            FROM journal_entries
            WHERE user_id = $1
            ORDER BY entry_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(JournalEntry::from).collect())
    }

    async fn get(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<JournalEntry>> {
        let row = sqlx::query_as::<_, JournalRow>(
            r#"
            SELECT entry_date, text, notes, analysis, updated_at
            FROM journal_entries
            WHERE user_id = $1 AND entry_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(JournalEntry::from))
    }

    async fn upsert(&self, user_id: &str, write: JournalWrite) -> AppResult<JournalEntry> {
        let row = sqlx::query_as::<_, JournalRow>(
            r#"
            INSERT INTO journal_entries (user_id, entry_date, text, notes, analysis)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, entry_date) DO UPDATE SET
                text = EXCLUDED.text,
                notes = EXCLUDED.notes,
                analysis = EXCLUDED.analysis,
                updated_at = NOW()
            RETURNING entry_date, text, notes, analysis, updated_at
            "#,
        )
        .bind(user_id)
        .bind(write.date)
        .bind(&write.text)
        .bind(&write.notes)
        .bind(write.analysis.map(Json))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await
            .is_ok()
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local repository for development without Postgres, and for tests.
#[derive(Default)]
pub struct MemoryJournalRepository {
    entries: RwLock<HashMap<String, BTreeMap<NaiveDate, JournalEntry>>>,
}

impl MemoryJournalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalRepository for MemoryJournalRepository {
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<JournalEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(user_id)
            .map(|days| days.values().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<JournalEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(user_id).and_then(|days| days.get(&date)).cloned())
    }

    async fn upsert(&self, user_id: &str, write: JournalWrite) -> AppResult<JournalEntry> {
        let entry = write.into_entry(Utc::now());
        self.entries
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(entry.date, entry.clone());
        Ok(entry)
    }

    async fn ping(&self) -> bool {
        true
    }
}
