use async_trait::async_trait;

use crate::models::analysis::EmotionAnalysis;
use crate::models::history::MAX_TEXT_CHARS;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("Analysis service unreachable: {0}")]
    Connectivity(String),

    #[error("Analysis service rejected the credentials")]
    Unauthorized,

    /// Non-success reply; `status` is the upstream HTTP status when known.
    #[error("Analysis service error: {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Unreadable analysis response: {0}")]
    InvalidResponse(String),
}

/// Produces an [`EmotionAnalysis`] for free text.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<EmotionAnalysis, AnalysisError>;
}

/// Input rules shared by every analyzer: non-blank, at most
/// [`MAX_TEXT_CHARS`] characters.
pub fn validate_text(text: &str) -> Result<(), AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::Validation("Text is required for analysis".into()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(AnalysisError::Validation(format!(
            "Text is too long. Please limit to {} characters.",
            MAX_TEXT_CHARS
        )));
    }
    Ok(())
}
