use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::analysis::{validate_text, AnalysisError, AnalysisService};
use crate::models::analysis::{EmotionAnalysis, OverallTone, PrimaryEmotion};

const MAX_PRIMARY_EMOTIONS: usize = 3;

/// Analyzer backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiAnalyzer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Loose shape of what the model returns; checked field by field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    overall_tone: Option<String>,
    primary_emotions: Option<Vec<PrimaryEmotion>>,
    cause_explanation: Option<String>,
    suggestion: Option<String>,
}

impl OpenAiAnalyzer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AnalysisError::Connectivity(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn prompt(text: &str) -> String {
        let tones: Vec<&str> = OverallTone::ALL.iter().map(|t| t.label()).collect();
        format!(
            r#"Analyze the emotional content of the following text and provide a JSON response with these exact fields:

{{
  "overallTone": "one of: {}",
  "primaryEmotions": [{{"emotion": "emotion name", "percentage": number}}],
  "causeExplanation": "1-2 sentence explanation of what's causing these emotions",
  "suggestion": "1 sentence constructive suggestion for emotional well-being or action"
}}

Rules:
- Include 1-3 primary emotions maximum
- Percentages should add up to 100
- Keep explanations concise and helpful
- Make suggestions constructive and actionable

Text to analyze: "{}""#,
            tones.join(", "),
            text
        )
    }
}

/// Turn the model's message content into an analysis stamped with `now`.
pub(crate) fn parse_content(content: &str, now: DateTime<Utc>) -> Result<EmotionAnalysis, AnalysisError> {
    // Models sometimes wrap JSON in a code fence.
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let raw: RawAnalysis =
        serde_json::from_str(json).map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

    let missing = |field: &str| AnalysisError::InvalidResponse(format!("missing {}", field));
    let tone = raw.overall_tone.ok_or_else(|| missing("overallTone"))?;
    let mut primary_emotions = raw.primary_emotions.ok_or_else(|| missing("primaryEmotions"))?;
    let cause_explanation = raw.cause_explanation.ok_or_else(|| missing("causeExplanation"))?;
    let suggestion = raw.suggestion.ok_or_else(|| missing("suggestion"))?;

    let overall_tone = tone
        .parse::<OverallTone>()
        .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
    if primary_emotions.is_empty() {
        return Err(missing("primaryEmotions"));
    }
    primary_emotions.truncate(MAX_PRIMARY_EMOTIONS);

    Ok(EmotionAnalysis {
        overall_tone,
        primary_emotions,
        cause_explanation,
        suggestion,
        timestamp: now,
    })
}

#[async_trait]
impl AnalysisService for OpenAiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<EmotionAnalysis, AnalysisError> {
        validate_text(text)?;

        tracing::debug!(chars = text.chars().count(), "Requesting emotion analysis");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": Self::prompt(text) }],
                "temperature": 0.3,
                "max_tokens": 500,
            }))
            .send()
            .await
            .map_err(|e| AnalysisError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AnalysisError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let completion: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
        let content = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AnalysisError::InvalidResponse("no message content".into()))?;

        let analysis = parse_content(content, Utc::now())?;
        tracing::info!(tone = %analysis.overall_tone, "Analysis completed");
        Ok(analysis)
    }
}
