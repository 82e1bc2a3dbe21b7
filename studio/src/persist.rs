//! Persistence gateway — load and save through the notation storage
//! collaborator.
//!
//! DESIGN
//! ======
//! Loading unions every stored record for the score into one content set; a
//! score annotated across several sessions may have several records and all
//! of them count. Saving writes the full current content as one new record
//! (full replace, not incremental diffs), so a reload merges back exactly
//! what was on screen.
//!
//! ERROR HANDLING
//! ==============
//! Load failures are non-fatal: a score with no annotations yet looks the
//! same as a failed fetch, so the gateway logs and returns empty content.
//! A malformed record is skipped; the remaining records still merge. Save
//! failures surface to the caller so the host can show a retry notice — the
//! local store is never touched on the failure path.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use overlay::doc::NotationContent;
use tracing::{info, warn};

use crate::notation::{NotationStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("saving notations failed: {0}")]
    Save(#[from] StoreError),
}

/// Fetch and merge all stored notation content for a score.
pub async fn load(store: &impl NotationStore, score_id: &str) -> NotationContent {
    let records = match store.list(score_id).await {
        Ok(records) => records,
        Err(error) => {
            warn!(score_id, %error, "notation load failed; starting empty");
            return NotationContent::default();
        }
    };

    let mut merged = NotationContent::default();
    for record in records {
        match decode_content(&record.content) {
            Some(content) => {
                merged.annotations.extend(content.annotations);
                merged.strokes.extend(content.strokes);
            }
            None => warn!(notation_id = %record.id, "skipping malformed notation record"),
        }
    }

    info!(
        score_id,
        annotations = merged.annotations.len(),
        strokes = merged.strokes.len(),
        "notations loaded"
    );
    merged
}

/// Save the full current content as one record.
pub async fn save(
    store: &impl NotationStore,
    score_id: &str,
    content: &NotationContent,
) -> Result<(), PersistError> {
    store.create(score_id, content).await?;
    info!(
        score_id,
        annotations = content.annotations.len(),
        strokes = content.strokes.len(),
        "notations saved"
    );
    Ok(())
}

/// Decode one record's content, tolerating both storage shapes.
fn decode_content(value: &serde_json::Value) -> Option<NotationContent> {
    match value {
        serde_json::Value::String(raw) => serde_json::from_str(raw).ok(),
        other => serde_json::from_value(other.clone()).ok(),
    }
}
