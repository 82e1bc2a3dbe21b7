//! Page-change synchronization between the viewer and the engine.
//!
//! When the viewer moves to another page three things must happen, in order:
//! the in-flight stroke (if any) is committed so drawing never silently
//! crosses a page boundary, the transient overlay surface is repainted, and
//! the engine gets the new page's rectangle — but only after the renderer
//! has actually finished laying the page out. The engine handles the first
//! two synchronously; this module owns the awaited part.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use overlay::engine::{Action, OverlayEngine};
use tracing::debug;

use crate::renderer::ScoreRenderer;

/// React to a page-change notification from the rendering engine.
///
/// Returns the engine's actions (stroke commit, repaint) for the host to
/// process. By the time this resolves, the engine's layout rectangle is the
/// settled one for the new page.
pub async fn on_page_change(
    engine: &mut OverlayEngine,
    renderer: &impl ScoreRenderer,
    new_page: u32,
) -> Vec<Action> {
    let actions = engine.on_page_change(new_page);

    renderer.wait_layout_settled(new_page).await;
    let layout = renderer.page_layout();
    engine.set_layout(layout);
    debug!(page = new_page, ?layout, "page layout settled");

    actions
}
