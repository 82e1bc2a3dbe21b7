//! Score metadata and its REST collaborator.

use serde::{Deserialize, Serialize};

/// Metadata for one score, as served by the scores endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    pub title: String,
    /// URL of the source PDF; absent for scores that were never rendered.
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("score service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Resolves score ids to metadata.
#[allow(async_fn_in_trait)]
pub trait ScoreDirectory {
    async fn get_score(&self, id: &str) -> Result<Score, ScoreError>;
}

/// REST client for the score metadata collaborator.
pub struct ScoreClient {
    base_url: String,
    http: reqwest::Client,
}

impl ScoreClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }
}

impl ScoreDirectory for ScoreClient {
    async fn get_score(&self, id: &str) -> Result<Score, ScoreError> {
        let url = format!("{}/scores/{id}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(ScoreError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }
}
