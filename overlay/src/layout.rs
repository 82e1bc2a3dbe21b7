#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};

/// A point in either container-pixel or page-fraction space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The active page's rendered rectangle, in container-relative pixels.
///
/// Recomputed whenever the page, the container size, or the zoom level
/// changes. All persisted coordinates are page fractions, so a layout change
/// never requires rewriting stored data — only this rectangle moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PageLayout {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Convert a container-pixel point to page fractions (0–1 inside the page).
    #[must_use]
    pub fn to_fraction(&self, pixel: Point) -> Point {
        Point {
            x: (pixel.x - self.left) / self.width,
            y: (pixel.y - self.top) / self.height,
        }
    }

    /// Convert a page-fraction point back to container pixels.
    #[must_use]
    pub fn to_pixel(&self, fraction: Point) -> Point {
        Point {
            x: self.left + fraction.x * self.width,
            y: self.top + fraction.y * self.height,
        }
    }

    /// Whether a container-pixel point falls inside the page rectangle.
    ///
    /// Pointer events outside the page are rejected, never clamped — clamping
    /// would produce ambiguous edge annotations.
    #[must_use]
    pub fn contains(&self, pixel: Point) -> bool {
        pixel.x >= self.left
            && pixel.y >= self.top
            && pixel.x <= self.left + self.width
            && pixel.y <= self.top + self.height
    }
}
