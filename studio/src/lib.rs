//! Integration layer around the annotation overlay engine.
//!
//! Everything here talks to the outside world: the score-rendering engine,
//! the document encoder, and the REST collaborators for notation storage and
//! score metadata. The pure engine lives in the `overlay` crate; this crate
//! owns the suspension points — network calls, renderer settlement, export —
//! and keeps them off the engine's single-threaded mutation path.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | One open score: engine + collaborators glued together |
//! | [`renderer`] | [`renderer::ScoreRenderer`] collaborator interface |
//! | [`export`] | Flattening pipeline and [`export::DocumentEncoder`] |
//! | [`sync`] | Page-change synchronization |
//! | [`persist`] | Load/save gateway over notation storage |
//! | [`notation`] | Notation records and the REST storage client |
//! | [`score`] | Score metadata and its REST client |

pub mod export;
pub mod notation;
pub mod persist;
pub mod renderer;
pub mod score;
pub mod session;
pub mod sync;
