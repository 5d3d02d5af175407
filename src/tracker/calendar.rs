use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dto::UpsertJournalRequest;
use crate::models::journal::JournalEntry;
use crate::services::analysis::{AnalysisError, AnalysisService};

use super::journal_store::{JournalError, JournalStore};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Read-through view of one user's journal for a calendar screen.
///
/// The date map is seeded from `list_all` when the view opens. A day is served
/// from the map when present and fetched remotely otherwise. Any write drops
/// the map and reseeds it from the backend; nothing is written locally first.
pub struct CalendarView {
    store: JournalStore,
    user_id: String,
    /// `None` after a write whose refresh failed.
    entries: Option<HashMap<NaiveDate, JournalEntry>>,
}

impl CalendarView {
    /// Seed the view. A failure here is a load failure, distinct from an
    /// empty journal.
    pub async fn open(store: JournalStore, user_id: impl Into<String>) -> Result<Self, JournalError> {
        let user_id = user_id.into();
        let entries = store.list_all(&user_id).await?;
        tracing::debug!(user_id = %user_id, entries = entries.len(), "Calendar view seeded");

        Ok(Self {
            store,
            user_id,
            entries: Some(entries),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn entries(&self) -> Option<&HashMap<NaiveDate, JournalEntry>> {
        self.entries.as_ref()
    }

    /// Whether the seeded map has an entry for `date`, for day markers.
    pub fn has_entry(&self, date: NaiveDate) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.contains_key(&date))
    }

    /// `Ok(None)` means the day is empty; errors mean it could not be loaded.
    pub async fn open_day(&mut self, date: NaiveDate) -> Result<Option<JournalEntry>, JournalError> {
        if let Some(entry) = self.entries.as_ref().and_then(|entries| entries.get(&date)) {
            return Ok(Some(entry.clone()));
        }

        match self.store.get(&self.user_id, date).await {
            Ok(entry) => {
                if let Some(entries) = self.entries.as_mut() {
                    entries.insert(date, entry.clone());
                }
                Ok(Some(entry))
            }
            Err(JournalError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write through to the backend, then invalidate and reseed the map.
    ///
    /// The write has succeeded once this returns `Ok`, even if the reseed
    /// failed; in that case the map stays invalidated and days are fetched
    /// remotely until [`CalendarView::refresh`] succeeds.
    pub async fn save(&mut self, request: UpsertJournalRequest) -> Result<JournalEntry, JournalError> {
        let entry = self.store.upsert(&self.user_id, request).await?;

        self.entries = None;
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Journal saved but calendar refresh failed");
        }

        Ok(entry)
    }

    /// Save, first running `analyzer` when the request has no analysis and
    /// its text is not blank.
    pub async fn save_with_analysis(
        &mut self,
        mut request: UpsertJournalRequest,
        analyzer: &dyn AnalysisService,
    ) -> Result<JournalEntry, CalendarError> {
        let needs_analysis = request.analysis.is_none()
            && request
                .text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty());

        if needs_analysis {
            if let Some(text) = request.text.as_deref() {
                request.analysis = Some(analyzer.analyze(text).await?);
            }
        }

        Ok(self.save(request).await?)
    }

    pub async fn refresh(&mut self) -> Result<(), JournalError> {
        let entries = self.store.list_all(&self.user_id).await?;
        self.entries = Some(entries);
        Ok(())
    }
}
