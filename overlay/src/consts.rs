//! Shared numeric constants for the overlay crate.

// ── Gestures ────────────────────────────────────────────────────

/// Minimum width and height of a text-box drag, as a fraction of the page.
/// Drags at or below this size in either axis are discarded.
pub const MIN_BOX_FRACTION: f64 = 0.01;

/// Minimum number of recorded points for a stroke to be committed.
/// A single click never produces a stroke.
pub const MIN_STROKE_POINTS: usize = 2;

/// Stroke color applied when the user has not picked one.
pub const DEFAULT_DRAW_COLOR: &str = "#000000";

// ── Compositing ─────────────────────────────────────────────────

/// Stroke line width in raster pixels.
pub const STROKE_WIDTH_PX: f32 = 2.0;

/// Font size for baked annotation text, in raster pixels.
pub const TEXT_SIZE_PX: f32 = 16.0;

/// Inset between a text box border and its text, in raster pixels.
pub const TEXT_PADDING_PX: f32 = 4.0;

/// Color for text-box borders and baked text.
pub const TEXT_COLOR: [u8; 4] = [0x22, 0x22, 0x22, 0xff];
