//! The score-rendering collaborator interface.
//!
//! The rendering engine itself is external: it opens the document, paints
//! pages into the viewer, and knows the current page's on-screen rectangle.
//! This crate only consumes it, for two things — rasterizing pages during
//! export and reading the page rectangle after a page change.
//!
//! Layout settlement is an awaitable signal, not a timer: callers await
//! [`ScoreRenderer::wait_layout_settled`] before trusting
//! [`ScoreRenderer::page_layout`], so there is no fixed delay to tune and no
//! stale rectangle to race against.

use image::RgbaImage;
use overlay::layout::PageLayout;

/// Errors surfaced by the rendering engine.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {0} out of range")]
    PageOutOfRange(u32),
    #[error("render failed: {0}")]
    Failed(String),
}

/// The document-rendering engine, as consumed by this crate.
///
/// Page-change and document-load notifications arrive from the host surface
/// as calls into [`crate::session::AnnotationSession`]; they are not part of
/// this interface.
#[allow(async_fn_in_trait)]
pub trait ScoreRenderer {
    /// Number of pages in the open document.
    fn page_count(&self) -> u32;

    /// Rasterize one page at the given scale factor.
    async fn render_page(&self, index: u32, scale: f32) -> Result<RgbaImage, RenderError>;

    /// The current page's rendered rectangle in container-relative pixels.
    /// Only meaningful after [`Self::wait_layout_settled`] has resolved for
    /// the page in question.
    fn page_layout(&self) -> PageLayout;

    /// Resolves once the renderer has finished laying out the given page.
    async fn wait_layout_settled(&self, index: u32);
}
