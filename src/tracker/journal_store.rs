use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::dto::UpsertJournalRequest;
use crate::models::journal::{JournalEntry, JournalWrite};

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// No entry for that day. Expected when opening an empty calendar day.
    #[error("No journal entry for {0}")]
    NotFound(NaiveDate),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Journal service unreachable: {0}")]
    Connectivity(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Journal service error {status}: {message}")]
    Remote { status: u16, message: String },
}

impl JournalError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, JournalError::NotFound(_))
    }
}

/// Remote, authoritative journal storage.
#[async_trait]
pub trait JournalBackend: Send + Sync {
    async fn list_all(&self, user_id: &str) -> Result<Vec<JournalEntry>, JournalError>;

    /// Must return [`JournalError::NotFound`] when the day has no entry.
    async fn get(&self, user_id: &str, date: NaiveDate) -> Result<JournalEntry, JournalError>;

    /// Insert or replace the entry for `(user_id, write.date)`.
    async fn upsert(&self, user_id: &str, write: &JournalWrite) -> Result<JournalEntry, JournalError>;
}

/// Thin, validating front for a [`JournalBackend`]. Holds no state and never
/// retries; every call goes to the backend.
#[derive(Clone)]
pub struct JournalStore {
    backend: Arc<dyn JournalBackend>,
}

impl JournalStore {
    pub fn new(backend: Arc<dyn JournalBackend>) -> Self {
        Self { backend }
    }

    /// Every entry of `user_id`, keyed by day. No ordering is implied.
    pub async fn list_all(&self, user_id: &str) -> Result<HashMap<NaiveDate, JournalEntry>, JournalError> {
        let entries = self.backend.list_all(user_id).await?;
        let mut by_date = HashMap::with_capacity(entries.len());
        for entry in entries {
            if let Some(previous) = by_date.insert(entry.date, entry) {
                tracing::warn!(date = %previous.date, "Backend returned duplicate journal day, keeping last");
            }
        }
        Ok(by_date)
    }

    pub async fn get(&self, user_id: &str, date: NaiveDate) -> Result<JournalEntry, JournalError> {
        self.backend.get(user_id, date).await
    }

    /// Validate and write. Analysis is never computed here; callers that
    /// want one attach it to the request first.
    pub async fn upsert(&self, user_id: &str, request: UpsertJournalRequest) -> Result<JournalEntry, JournalError> {
        let write = request.into_write().map_err(JournalError::Validation)?;
        let entry = self.backend.upsert(user_id, &write).await?;
        tracing::info!(date = %entry.date, has_analysis = entry.analysis.is_some(), "Journal entry saved");
        Ok(entry)
    }
}
