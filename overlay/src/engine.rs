//! The overlay engine: all state mutation flows through here.
//!
//! The engine is synchronous and single-threaded — pointer events, page
//! changes, and undo/redo all run to completion on one queue, so the store
//! never sees a half-applied mutation. Hosts feed it pointer positions in
//! container pixels and get back a list of [`Action`]s describing what they
//! need to do (repaint, focus a new text box).
//!
//! Mutation discipline: every user-initiated mutation pushes an undo
//! snapshot *before* applying itself. The two exemptions are undo/redo
//! application and load-time merging, which go through the store's
//! `restore`/`merge` directly.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use uuid::Uuid;

use crate::consts::{DEFAULT_DRAW_COLOR, MIN_BOX_FRACTION, MIN_STROKE_POINTS};
use crate::doc::{Annotation, AnnotationPatch, NotationContent, NotationDoc, Stroke};
use crate::history::History;
use crate::input::{Gesture, Mode};
use crate::layout::{PageLayout, Point};

/// Effects returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A stroke was committed to the store.
    StrokeCommitted,
    /// A new annotation was created and is in edit state; the host should
    /// focus its text editor.
    AnnotationCreated { id: String },
    /// The overlay must be repainted from the store.
    RenderNeeded,
}

/// Core engine state for the annotation overlay.
///
/// Owns the store, the history stacks, the armed tool mode, and the active
/// gesture. The page layout rectangle is fed in from outside whenever the
/// renderer reports a new one; until then pointer events are ignored.
#[derive(Debug)]
pub struct OverlayEngine {
    pub doc: NotationDoc,
    pub history: History,
    pub mode: Mode,
    pub gesture: Gesture,
    /// Current page rectangle in container pixels; `None` while the renderer
    /// is still laying out.
    pub layout: Option<PageLayout>,
    /// 0-based page currently visible in the viewer.
    pub current_page: u32,
    /// Color applied to newly started strokes.
    pub draw_color: String,
    /// Annotation currently in text-edit state. At most one at a time.
    pub editing: Option<String>,
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self {
            doc: NotationDoc::new(),
            history: History::new(),
            mode: Mode::None,
            gesture: Gesture::Idle,
            layout: None,
            current_page: 0,
            draw_color: DEFAULT_DRAW_COLOR.to_owned(),
            editing: None,
        }
    }
}

impl OverlayEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Toolbar inputs ---

    /// Arm a tool. Switching away mid-stroke finalizes the stroke the same
    /// way pointer-up would.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        let mut actions = Vec::new();
        if mode != Mode::Draw
            && matches!(self.gesture, Gesture::DrawingStroke { .. })
        {
            actions = self.finish_gesture();
        }
        self.mode = mode;
        actions
    }

    /// Color for subsequent strokes. Strokes already drawn keep theirs.
    pub fn set_draw_color(&mut self, color: impl Into<String>) {
        self.draw_color = color.into();
    }

    /// Install the page rectangle reported by the renderer.
    pub fn set_layout(&mut self, layout: PageLayout) {
        self.layout = Some(layout);
    }

    // --- Pointer events ---

    /// Pointer pressed at a container-pixel position.
    pub fn on_pointer_down(&mut self, pixel: Point) -> Vec<Action> {
        let Some(layout) = self.layout else {
            return Vec::new();
        };
        if !layout.contains(pixel) {
            return Vec::new();
        }

        match self.mode {
            Mode::Draw => {
                self.history.push_undo(self.doc.snapshot());
                let start = layout.to_fraction(pixel);
                self.gesture = Gesture::DrawingStroke {
                    stroke: Stroke {
                        page_number: self.current_page,
                        color: self.draw_color.clone(),
                        points: vec![start],
                    },
                };
                vec![Action::RenderNeeded]
            }
            Mode::Text => {
                let corner = layout.to_fraction(pixel);
                self.gesture = Gesture::DraggingRect { origin: corner, current: corner };
                vec![Action::RenderNeeded]
            }
            Mode::None => Vec::new(),
        }
    }

    /// Pointer moved. Positions outside the page rectangle are ignored, not
    /// clamped — a stroke simply stops growing at the edge.
    pub fn on_pointer_move(&mut self, pixel: Point) -> Vec<Action> {
        let Some(layout) = self.layout else {
            return Vec::new();
        };
        if !layout.contains(pixel) {
            return Vec::new();
        }

        match &mut self.gesture {
            Gesture::DrawingStroke { stroke } => {
                stroke.points.push(layout.to_fraction(pixel));
                vec![Action::RenderNeeded]
            }
            Gesture::DraggingRect { current, .. } => {
                *current = layout.to_fraction(pixel);
                vec![Action::RenderNeeded]
            }
            Gesture::Idle => Vec::new(),
        }
    }

    /// Pointer released: commit or discard the active gesture.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.finish_gesture()
    }

    /// Pointer left the overlay — treated exactly like a release.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.finish_gesture()
    }

    fn finish_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.gesture) {
            Gesture::DrawingStroke { stroke } => {
                if stroke.points.len() >= MIN_STROKE_POINTS {
                    self.doc.add_stroke(stroke);
                    vec![Action::StrokeCommitted, Action::RenderNeeded]
                } else {
                    // A single click: nothing to keep.
                    vec![Action::RenderNeeded]
                }
            }
            Gesture::DraggingRect { origin, current } => {
                // The drag always disarms the text tool, kept or not.
                self.mode = Mode::None;

                let x = origin.x.min(current.x);
                let y = origin.y.min(current.y);
                let width = (current.x - origin.x).abs();
                let height = (current.y - origin.y).abs();
                if width > MIN_BOX_FRACTION && height > MIN_BOX_FRACTION {
                    self.history.push_undo(self.doc.snapshot());
                    let id = Uuid::new_v4().to_string();
                    self.doc.add_annotation(Annotation {
                        id: id.clone(),
                        x,
                        y,
                        width,
                        height,
                        text: String::new(),
                        page_number: self.current_page,
                    });
                    self.editing = Some(id.clone());
                    vec![Action::AnnotationCreated { id }, Action::RenderNeeded]
                } else {
                    vec![Action::RenderNeeded]
                }
            }
            Gesture::Idle => Vec::new(),
        }
    }

    // --- Page synchronization ---

    /// The viewer moved to another page. Any in-flight stroke with enough
    /// points is committed exactly as pointer-up would — drawing never
    /// silently crosses a page boundary. The layout becomes stale until the
    /// renderer reports the new page's rectangle.
    pub fn on_page_change(&mut self, page: u32) -> Vec<Action> {
        let mut actions = match std::mem::take(&mut self.gesture) {
            Gesture::DrawingStroke { stroke } if stroke.points.len() >= MIN_STROKE_POINTS => {
                self.doc.add_stroke(stroke);
                vec![Action::StrokeCommitted]
            }
            _ => Vec::new(),
        };
        self.current_page = page;
        self.layout = None;
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Text editing ---

    /// Enter edit state for an existing annotation (double-click). Only one
    /// annotation can be in edit state at a time.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if self.doc.annotation(id).is_none() {
            return false;
        }
        self.editing = Some(id.to_owned());
        true
    }

    /// Apply one keystroke-level text change. Coarse-grained undo per
    /// keystroke is accepted: text edits are rare next to drawing.
    pub fn edit_text(&mut self, id: &str, value: impl Into<String>) -> Vec<Action> {
        if self.doc.annotation(id).is_none() {
            return Vec::new();
        }
        self.history.push_undo(self.doc.snapshot());
        self.doc.update_annotation(id, &AnnotationPatch::text(value));
        vec![Action::RenderNeeded]
    }

    /// Leave edit state (blur, or Enter without Shift).
    pub fn commit_edit(&mut self) {
        self.editing = None;
    }

    // --- History ---

    /// Undo the latest mutation. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.doc.snapshot()) {
            Some(previous) => {
                self.doc.restore(previous);
                true
            }
            None => false,
        }
    }

    /// Redo the latest undone mutation. Returns `false` when there is none.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.doc.snapshot()) {
            Some(next) => {
                self.doc.restore(next);
                true
            }
            None => false,
        }
    }

    // --- Queries ---

    /// Full state for export: the store plus the in-flight stroke, so a
    /// drawing in progress is not lost from a flattened copy.
    #[must_use]
    pub fn export_content(&self) -> NotationContent {
        let mut content = self.doc.snapshot();
        if let Gesture::DrawingStroke { stroke } = &self.gesture
            && stroke.points.len() >= MIN_STROKE_POINTS
        {
            content.strokes.push(stroke.clone());
        }
        content
    }

    /// The annotation currently in edit state, if any.
    #[must_use]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }
}
