use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use super::error_message;
use crate::dto::{JournalEntryResponse, JournalListResponse, UpsertJournalRequest};
use crate::models::journal::{JournalEntry, JournalWrite};
use crate::tracker::journal_store::{JournalBackend, JournalError};

/// Identity collaborator: hands out bearer tokens for a user.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self, user_id: &str) -> Result<String, JournalError>;
}

/// A single pre-issued token for one user.
pub struct StaticCredentials {
    user_id: String,
    token: String,
}

impl StaticCredentials {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self, user_id: &str) -> Result<String, JournalError> {
        if user_id != self.user_id {
            return Err(JournalError::Unauthorized);
        }
        Ok(self.token.clone())
    }
}

/// [`JournalBackend`] over the companion server's `/journal` routes.
pub struct HttpJournalBackend {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpJournalBackend {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    async fn send(&self, user_id: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response, JournalError> {
        let token = self.credentials.bearer_token(user_id).await?;
        request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| JournalError::Connectivity(e.to_string()))
    }
}

async fn failure(response: reqwest::Response) -> JournalError {
    match response.status() {
        StatusCode::UNAUTHORIZED => JournalError::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            JournalError::Validation(error_message(response).await)
        }
        status => JournalError::Remote {
            status: status.as_u16(),
            message: error_message(response).await,
        },
    }
}

fn decode_error(e: reqwest::Error) -> JournalError {
    JournalError::Remote {
        status: e.status().map(|s| s.as_u16()).unwrap_or(200),
        message: format!("unreadable response: {}", e),
    }
}

#[async_trait]
impl JournalBackend for HttpJournalBackend {
    async fn list_all(&self, user_id: &str) -> Result<Vec<JournalEntry>, JournalError> {
        let request = self.client.get(format!("{}/journal", self.base_url));
        let response = self.send(user_id, request).await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let body: JournalListResponse = response.json().await.map_err(decode_error)?;
        Ok(body.entries)
    }

    async fn get(&self, user_id: &str, date: NaiveDate) -> Result<JournalEntry, JournalError> {
        let request = self
            .client
            .get(format!("{}/journal/{}", self.base_url, date.format("%Y-%m-%d")));
        let response = self.send(user_id, request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(JournalError::NotFound(date));
        }
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let body: JournalEntryResponse = response.json().await.map_err(decode_error)?;
        Ok(body.entry)
    }

    async fn upsert(&self, user_id: &str, write: &JournalWrite) -> Result<JournalEntry, JournalError> {
        let payload = UpsertJournalRequest {
            date: Some(write.date),
            text: Some(write.text.clone()),
            notes: write.notes.clone(),
            analysis: write.analysis.clone(),
        };
        let request = self
            .client
            .post(format!("{}/journal", self.base_url))
            .json(&payload);
        let response = self.send(user_id, request).await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let body: JournalEntryResponse = response.json().await.map_err(decode_error)?;
        Ok(body.entry)
    }
}
