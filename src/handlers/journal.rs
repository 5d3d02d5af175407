use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use chrono::NaiveDate;

use crate::auth::middleware::AuthUser;
use crate::dto::{JournalEntryResponse, JournalListResponse, UpsertJournalRequest};
use crate::error::{AppError, AppResult};
use crate::AppState;

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<JournalListResponse>> {
    let entries = state.journal.list_for_user(&auth_user.id).await?;
    Ok(Json(JournalListResponse { entries }))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> AppResult<Json<JournalEntryResponse>> {
    // A day that cannot exist cannot have an entry.
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::NotFound("Journal entry not found".into()))?;

    let entry = state
        .journal
        .get(&auth_user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("Journal entry not found".into()))?;

    Ok(Json(JournalEntryResponse { entry }))
}

pub async fn upsert_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Result<Json<UpsertJournalRequest>, JsonRejection>,
) -> AppResult<Json<JournalEntryResponse>> {
    let Json(body) = body?;
    let write = body.into_write().map_err(AppError::Validation)?;

    let entry = state.journal.upsert(&auth_user.id, write).await?;

    tracing::info!(
        user_id = %auth_user.id,
        date = %entry.date,
        analyzed = entry.analysis.is_some(),
        "Journal entry saved"
    );

    Ok(Json(JournalEntryResponse { entry }))
}
