//! One open score: the engine and its collaborators, glued together.
//!
//! `AnnotationSession` is the integration point the host surface drives. It
//! owns the overlay engine plus handles to the four external collaborators
//! and routes the host's events — document load, page changes, save and
//! export requests — to the right place. Pointer and toolbar events go
//! straight to the engine via [`AnnotationSession::engine_mut`].
//!
//! The engine's store is the single source of truth: export and save read
//! it synchronously at call time, so state scheduled from older events can
//! never go stale.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use ab_glyph::FontArc;
use overlay::engine::{Action, OverlayEngine};
use tracing::info;

use crate::export::{self, DocumentEncoder, ExportError, ExportedDocument};
use crate::notation::NotationStore;
use crate::persist::{self, PersistError};
use crate::renderer::ScoreRenderer;
use crate::score::{Score, ScoreDirectory, ScoreError};
use crate::sync;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("score has no PDF source")]
    NoSource,
}

/// An annotation session over one score.
pub struct AnnotationSession<D, N, R, E> {
    engine: OverlayEngine,
    directory: D,
    notations: N,
    renderer: R,
    encoder: E,
    score_id: String,
    score: Option<Score>,
    /// Font used to bake annotation text during export, when available.
    text_font: Option<FontArc>,
}

impl<D, N, R, E> AnnotationSession<D, N, R, E>
where
    D: ScoreDirectory,
    N: NotationStore,
    R: ScoreRenderer,
    E: DocumentEncoder,
{
    #[must_use]
    pub fn new(score_id: impl Into<String>, directory: D, notations: N, renderer: R, encoder: E) -> Self {
        Self {
            engine: OverlayEngine::new(),
            directory,
            notations,
            renderer,
            encoder,
            score_id: score_id.into(),
            score: None,
            text_font: None,
        }
    }

    /// Resolve the score's metadata. Fails when the score cannot be fetched
    /// or has no PDF source to annotate.
    pub async fn open(&mut self) -> Result<&Score, SessionError> {
        let score = self.directory.get_score(&self.score_id).await?;
        if score.pdf_url.as_deref().is_none_or(str::is_empty) {
            return Err(SessionError::NoSource);
        }
        info!(score_id = %self.score_id, title = %score.title, "score opened");
        Ok(self.score.insert(score))
    }

    /// The renderer finished loading the document: merge stored notations
    /// into the engine and read the first page's settled layout.
    ///
    /// Load failures are absorbed by the gateway — a score with no stored
    /// notations starts empty.
    pub async fn on_document_load(&mut self) {
        let content = persist::load(&self.notations, &self.score_id).await;
        self.engine.doc.merge(content);

        self.renderer.wait_layout_settled(self.engine.current_page).await;
        self.engine.set_layout(self.renderer.page_layout());
    }

    /// The viewer moved to another page.
    pub async fn on_page_change(&mut self, new_page: u32) -> Vec<Action> {
        sync::on_page_change(&mut self.engine, &self.renderer, new_page).await
    }

    /// Persist the current store content as one full-replace record.
    /// On failure the store is untouched and the host should surface a
    /// retry notice.
    pub async fn save(&self) -> Result<(), PersistError> {
        persist::save(&self.notations, &self.score_id, &self.engine.doc.snapshot()).await
    }

    /// Flatten the score with all current markup — including an in-flight
    /// stroke and unsaved text edits — into a downloadable document.
    pub async fn export(&self) -> Result<ExportedDocument, ExportError> {
        let content = self.engine.export_content();
        let title = self.score.as_ref().map_or("", |s| s.title.as_str());
        export::export(&self.renderer, &self.encoder, &content, title, self.text_font.as_ref()).await
    }

    /// Direct access to the engine for pointer, toolbar, edit, and history
    /// events.
    pub fn engine_mut(&mut self) -> &mut OverlayEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn engine(&self) -> &OverlayEngine {
        &self.engine
    }

    /// Font for baking annotation text during export. Without one, exported
    /// boxes are drawn but their text is skipped.
    pub fn set_text_font(&mut self, font: FontArc) {
        self.text_font = Some(font);
    }

    /// The annotation view occupies the full viewport while active. Hosts
    /// read this declarative property instead of hiding surrounding chrome
    /// out-of-band.
    #[must_use]
    pub fn full_viewport(&self) -> bool {
        true
    }

    /// Metadata of the opened score, once [`Self::open`] has succeeded.
    #[must_use]
    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }
}
