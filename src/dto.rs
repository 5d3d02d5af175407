//! # MoodMirror: Request/Response DTOs
//!
//! All API contract types in one module, shared by the companion server and
//! by the HTTP clients in [`crate::services`].
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Response` → serialized to client JSON
//! - Required-field validation is expressed via `validator` derive macros
//! - Keys are camelCase on the wire

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::analysis::EmotionAnalysis;
use crate::models::journal::{JournalEntry, JournalWrite};

// ============================================================================
// Common
// ============================================================================

/// Stable error envelope for every `AppError`, JSON body rejections included
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
}

// ============================================================================
// Analysis
// ============================================================================

/// POST /api/analyze
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Missing text is treated like empty text and rejected by the handler.
    #[serde(default)]
    pub text: String,
}

/// Response for POST /api/analyze
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: EmotionAnalysis,
}

// ============================================================================
// Journal
// ============================================================================

/// POST /api/journal: inserts or replaces the entry for `date`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertJournalRequest {
    #[validate(required(message = "date is required"))]
    pub date: Option<NaiveDate>,

    /// May be empty, but must be present.
    #[validate(required(message = "text is required"))]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Absent until the caller has run an analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<EmotionAnalysis>,
}

/// GET /api/journal
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalListResponse {
    pub entries: Vec<JournalEntry>,
}

/// GET /api/journal/{date} and POST /api/journal
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalEntryResponse {
    pub entry: JournalEntry,
}

// ============================================================================
// System
// ============================================================================

/// GET /api/health
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub openai_configured: bool,
}

// ============================================================================
// Validation helpers
// ============================================================================

impl UpsertJournalRequest {
    pub fn new(date: NaiveDate, text: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            text: Some(text.into()),
            notes: None,
            analysis: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_analysis(mut self, analysis: EmotionAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Check required fields and turn the request into a write.
    pub fn into_write(self) -> Result<JournalWrite, String> {
        self.validate().map_err(|e| validation_message(&e))?;

        match (self.date, self.text) {
            (Some(date), Some(text)) => Ok(JournalWrite {
                date,
                text,
                notes: self.notes,
                analysis: self.analysis,
            }),
            _ => Err("date and text are required".into()),
        }
    }
}

/// Flatten field errors into one message, fields in alphabetical order.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    #[test]
    fn test_upsert_requires_date() {
        let req = UpsertJournalRequest {
            text: Some("hello".into()),
            ..Default::default()
        };
        assert_eq!(req.into_write().unwrap_err(), "date is required");
    }

    #[test]
    fn test_upsert_requires_text() {
        let req = UpsertJournalRequest {
            date: Some(day()),
            ..Default::default()
        };
        assert_eq!(req.into_write().unwrap_err(), "text is required");
    }

    #[test]
    fn test_upsert_missing_both_lists_both() {
        let err = UpsertJournalRequest::default().into_write().unwrap_err();
        assert_eq!(err, "date is required; text is required");
    }

    #[test]
    fn test_upsert_accepts_empty_text() {
        let write = UpsertJournalRequest::new(day(), "").into_write().unwrap();
        assert_eq!(write.text, "");
        assert_eq!(write.date, day());
    }

    #[test]
    fn test_upsert_request_wire_shape() {
        let json = r#"{"date":"2024-03-14","text":"quiet day","notes":"private"}"#;
        let req: UpsertJournalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.date, Some(day()));
        assert_eq!(req.notes.as_deref(), Some("private"));
        assert!(req.analysis.is_none());

        let out = serde_json::to_value(UpsertJournalRequest::new(day(), "x")).unwrap();
        assert_eq!(out["date"], "2024-03-14");
        assert!(out.get("notes").is_none());
    }

    #[test]
    fn test_analyze_request_missing_text_defaults_empty() {
        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_empty());
    }
}
