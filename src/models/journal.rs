use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::EmotionAnalysis;

/// One journal entry per user per calendar day. The remote store owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub date: NaiveDate,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<EmotionAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A validated journal write. Built from
/// [`UpsertJournalRequest`](crate::dto::UpsertJournalRequest) once `date` and
/// `text` are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalWrite {
    pub date: NaiveDate,
    pub text: String,
    pub notes: Option<String>,
    pub analysis: Option<EmotionAnalysis>,
}

impl JournalWrite {
    pub fn into_entry(self, updated_at: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            date: self.date,
            text: self.text,
            analysis: self.analysis,
            notes: self.notes,
            updated_at,
        }
    }
}
