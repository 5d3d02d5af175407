//! Clients for the collaborators the tracker consumes: the emotion analysis
//! service and the remote journal backend.

pub mod analysis;
pub mod journal_client;
pub mod openai;
pub mod remote;

pub use analysis::{AnalysisError, AnalysisService};
pub use journal_client::{CredentialProvider, HttpJournalBackend, StaticCredentials};
pub use openai::OpenAiAnalyzer;
pub use remote::RemoteAnalyzer;

use crate::dto::ErrorResponse;

/// Best-effort message from an error response body: the `error.message` of
/// our envelope, else the raw body, else the status.
pub(crate) async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(envelope) = serde_json::from_str::<ErrorResponse>(&body) {
        return envelope.error.message;
    }
    if body.trim().is_empty() {
        format!("Server error: {}", status.as_u16())
    } else {
        body
    }
}
