//! Input model: tool modes and the pointer gesture state machine.
//!
//! `Mode` captures which annotation tool the toolbar has armed; it gates
//! which gesture transitions are legal but is otherwise orthogonal to them.
//! `Gesture` is the active pointer sequence being tracked between
//! pointer-down and pointer-up, carrying all context needed to commit (or
//! discard) the result on release.

use crate::doc::Stroke;
use crate::layout::Point;

/// Which annotation tool is currently armed. Set externally by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No tool armed; pointer events pass through to the viewer.
    #[default]
    None,
    /// Drag a rectangle to place a new text box.
    Text,
    /// Freehand drawing.
    Draw,
}

/// The pointer gesture currently in progress.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    /// No gesture; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A freehand stroke being drawn. The stroke is owned here — not by the
    /// store — until pointer-up or a page change commits it.
    DrawingStroke {
        stroke: Stroke,
    },
    /// A rectangle drag for a new text box. Fractional corners, live preview
    /// only; the store is not touched until release.
    DraggingRect {
        origin: Point,
        current: Point,
    },
}

impl Gesture {
    /// Whether any gesture is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
