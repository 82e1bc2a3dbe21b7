//! Notation records and the REST storage collaborator.
//!
//! A score's annotations are stored as notation records, each carrying one
//! `content` payload. Old records exist in two shapes — `content` as a
//! structured JSON object, or as a JSON-encoded string of one — so the
//! record type keeps `content` as a raw [`serde_json::Value`] and leaves
//! decoding to the persistence gateway.

use overlay::doc::NotationContent;
use serde::{Deserialize, Serialize};

/// One stored notation record for a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotationRecord {
    pub id: String,
    #[serde(rename = "scoreId")]
    pub score_id: String,
    /// Either a structured content object or a JSON-encoded string of one.
    pub content: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage returned status {0}")]
    Status(reqwest::StatusCode),
}

/// The notation-storage collaborator, as consumed by the persistence
/// gateway. Implemented over REST in production and in memory in tests.
#[allow(async_fn_in_trait)]
pub trait NotationStore {
    /// All stored records for a score.
    async fn list(&self, score_id: &str) -> Result<Vec<NotationRecord>, StoreError>;

    /// Store the given content as a new record.
    async fn create(&self, score_id: &str, content: &NotationContent) -> Result<(), StoreError>;

    /// Replace an existing record's content.
    async fn update(&self, notation_id: &str, content: &NotationContent) -> Result<(), StoreError>;
}

/// REST client for the notation storage collaborator.
pub struct NotationClient {
    base_url: String,
    http: reqwest::Client,
}

impl NotationClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }
}

impl NotationStore for NotationClient {
    async fn list(&self, score_id: &str) -> Result<Vec<NotationRecord>, StoreError> {
        let url = format!("{}/notation/{score_id}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    async fn create(&self, score_id: &str, content: &NotationContent) -> Result<(), StoreError> {
        let url = format!("{}/notation/", self.base_url);
        let body = serde_json::json!({
            "scoreId": score_id,
            "content": content,
        });
        let resp = self.http.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Status(resp.status()));
        }
        Ok(())
    }

    async fn update(&self, notation_id: &str, content: &NotationContent) -> Result<(), StoreError> {
        let url = format!("{}/notation/{notation_id}", self.base_url);
        let body = serde_json::json!({ "content": content });
        let resp = self.http.put(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Status(resp.status()));
        }
        Ok(())
    }
}
