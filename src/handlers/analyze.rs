use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dto::{AnalyzeRequest, AnalyzeResponse};
use crate::error::{AppError, AppResult};
use crate::services::analysis::{validate_text, AnalysisError};
use crate::AppState;

const NOT_CONFIGURED: &str = "AI service not configured. Please check server configuration.";
const TEMPORARILY_UNAVAILABLE: &str = "AI service temporarily unavailable. Please try again later.";
const CONFIGURATION_ERROR: &str = "AI service configuration error. Please contact support.";
const ANALYSIS_FAILED: &str = "Failed to analyze emotional content. Please try again.";

pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let Json(body) = body?;
    let analyzer = state.analyzer.as_ref().ok_or_else(|| {
        tracing::error!("Analyze called but no analysis provider is configured");
        AppError::Service(NOT_CONFIGURED.into())
    })?;

    validate_text(&body.text).map_err(into_app_error)?;

    tracing::info!(chars = body.text.chars().count(), "Analyzing text");

    let analysis = analyzer.analyze(&body.text).await.map_err(into_app_error)?;

    tracing::info!(tone = %analysis.overall_tone, "Analysis completed");

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

fn into_app_error(err: AnalysisError) -> AppError {
    match err {
        AnalysisError::Validation(msg) => AppError::Validation(msg),
        AnalysisError::Upstream {
            status: Some(429), ..
        } => {
            tracing::error!(error = %err, "Analysis provider quota exhausted");
            AppError::ServiceUnavailable(TEMPORARILY_UNAVAILABLE.into())
        }
        AnalysisError::Unauthorized => {
            tracing::error!("Analysis provider rejected the API key");
            AppError::Service(CONFIGURATION_ERROR.into())
        }
        other => {
            tracing::error!(error = %other, "Analysis failed");
            AppError::Service(ANALYSIS_FAILED.into())
        }
    }
}
