use async_trait::async_trait;
use reqwest::StatusCode;

use super::analysis::{validate_text, AnalysisError, AnalysisService};
use super::error_message;
use crate::dto::{AnalyzeRequest, AnalyzeResponse};
use crate::models::analysis::EmotionAnalysis;

/// Analyzer that delegates to the companion server's `POST /analyze`.
#[derive(Clone)]
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteAnalyzer {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AnalysisService for RemoteAnalyzer {
    async fn analyze(&self, text: &str) -> Result<EmotionAnalysis, AnalysisError> {
        validate_text(text)?;

        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .json(&AnalyzeRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| AnalysisError::Connectivity(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body: AnalyzeResponse = response
                    .json()
                    .await
                    .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
                Ok(body.analysis)
            }
            StatusCode::UNAUTHORIZED => Err(AnalysisError::Unauthorized),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(AnalysisError::Validation(error_message(response).await))
            }
            status => Err(AnalysisError::Upstream {
                status: Some(status.as_u16()),
                message: error_message(response).await,
            }),
        }
    }
}
