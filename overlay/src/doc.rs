//! Document model: annotations, strokes, and the in-memory store.
//!
//! This module defines the types that describe what the user has drawn on a
//! score (`Annotation`, `Stroke`), the wire shape they are persisted in
//! (`NotationContent`), a sparse-update type for annotation edits
//! (`AnnotationPatch`), and the runtime store that owns the live state
//! (`NotationDoc`).
//!
//! All coordinates are page fractions in the 0–1 range, so the data is
//! independent of zoom and container size. Page numbers are 0-based
//! throughout. Data flows into this layer from the persistence gateway
//! (deserialized records) and from the interaction engine (mutations); the
//! compositor reads from it through the page-filtered views.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::layout::Point;

/// A rectangular text box anchored to one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Unique identifier, generated at creation.
    pub id: String,
    /// Left edge as a fraction of page width.
    pub x: f64,
    /// Top edge as a fraction of page height.
    pub y: f64,
    /// Width as a fraction of page width. Always positive.
    pub width: f64,
    /// Height as a fraction of page height. Always positive.
    pub height: f64,
    /// Free-form body text; mutable after creation.
    pub text: String,
    /// 0-based page the box belongs to.
    pub page_number: u32,
}

/// One freehand polyline drawn in a single continuous pointer gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// 0-based page the stroke was drawn on; fixed at draw time, never
    /// reindexed when the viewer changes page.
    pub page_number: u32,
    /// Display color at creation time (CSS hex). Immutable per stroke.
    pub color: String,
    /// Ordered fractional points; append-only while the stroke is in
    /// progress.
    pub points: Vec<Point>,
}

/// The full annotation state of one score, in its stored wire shape.
///
/// The stroke list keeps the historical `drawPoints` field name so existing
/// records keep decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotationContent {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(rename = "drawPoints", default)]
    pub strokes: Vec<Stroke>,
}

impl NotationContent {
    /// Returns `true` if there is nothing drawn at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.strokes.is_empty()
    }
}

/// An immutable deep copy of the full state at one instant.
///
/// Snapshots are owned value clones: once taken they never alias live state
/// and are never mutated. Used only as undo/redo payload.
pub type Snapshot = NotationContent;

/// Sparse update for an annotation. Only present fields are applied.
#[derive(Debug, Clone, Default)]
pub struct AnnotationPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text: Option<String>,
}

impl AnnotationPatch {
    /// A patch that only replaces the text.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self { text: Some(value.into()), ..Self::default() }
    }
}

/// In-memory store of the current annotations and strokes.
///
/// The full set is always retained, including off-screen pages, so
/// navigating pages never loses data. The page-filtered views are the only
/// ones used for on-screen rendering.
#[derive(Debug, Default)]
pub struct NotationDoc {
    annotations: Vec<Annotation>,
    strokes: Vec<Stroke>,
}

impl NotationDoc {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly created annotation.
    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Append a committed stroke.
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Apply a sparse update to an existing annotation. Returns `false` if no
    /// annotation has the given id.
    pub fn update_annotation(&mut self, id: &str, patch: &AnnotationPatch) -> bool {
        let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if let Some(x) = patch.x {
            annotation.x = x;
        }
        if let Some(y) = patch.y {
            annotation.y = y;
        }
        if let Some(w) = patch.width {
            annotation.width = w;
        }
        if let Some(h) = patch.height {
            annotation.height = h;
        }
        if let Some(ref text) = patch.text {
            annotation.text = text.clone();
        }
        true
    }

    /// Look up an annotation by id.
    #[must_use]
    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// All annotations, in creation order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// All strokes, in commit order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Annotations belonging to one page — the only annotation view used for
    /// on-screen rendering.
    #[must_use]
    pub fn page_annotations(&self, page: u32) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.page_number == page).collect()
    }

    /// Strokes belonging to one page.
    #[must_use]
    pub fn page_strokes(&self, page: u32) -> Vec<&Stroke> {
        self.strokes.iter().filter(|s| s.page_number == page).collect()
    }

    /// Deep copy of the full state, for history snapshots, saving, and export.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        NotationContent {
            annotations: self.annotations.clone(),
            strokes: self.strokes.clone(),
        }
    }

    /// Replace the entire state. Used by undo/redo application and by the
    /// persistence gateway — the two paths that are exempt from push-undo.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.annotations = snapshot.annotations;
        self.strokes = snapshot.strokes;
    }

    /// Union loaded content into the store without replacing what is already
    /// there. Load-time records merge; they do not clobber each other.
    pub fn merge(&mut self, content: NotationContent) {
        self.annotations.extend(content.annotations);
        self.strokes.extend(content.strokes);
    }

    /// Returns `true` if the store contains no annotations and no strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.strokes.is_empty()
    }
}
