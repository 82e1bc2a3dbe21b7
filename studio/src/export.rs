//! Export pipeline: flattens the score into one downloadable document.
//!
//! For each page the rendering engine produces a high-scale raster, the
//! overlay compositor bakes that page's strokes and text boxes into it, and
//! the encoder collaborator assembles the pages — in page order — into a
//! single document. Export reads only in-memory state and never writes to
//! the storage collaborator.
//!
//! ERROR HANDLING
//! ==============
//! A renderer or encoder failure aborts the whole export: a partial
//! document that silently dropped pages would be worse than no document.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use ab_glyph::FontArc;
use image::RgbaImage;
use overlay::doc::NotationContent;
use overlay::render::composite_page;
use tracing::info;

use crate::renderer::{RenderError, ScoreRenderer};

/// Scale factor for export rasters. High enough that baked strokes and text
/// stay crisp in the output document.
pub const EXPORT_SCALE: f32 = 2.0;

/// Target page size of the output document, in document pixels.
pub const EXPORT_PAGE_SIZE: (f64, f64) = (1190.0, 1683.0);

/// Filename used when a score has no usable title.
pub const FALLBACK_FILENAME: &str = "partitura.pdf";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("document encoding failed: {0}")]
    Failed(String),
}

/// The document-encoding collaborator: turns ordered raster pages into one
/// downloadable document.
#[allow(async_fn_in_trait)]
pub trait DocumentEncoder {
    async fn encode(
        &self,
        pages: &[RgbaImage],
        page_size: (f64, f64),
    ) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("page {page} failed to render: {source}")]
    Render { page: u32, source: RenderError },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A finished export, ready to offer for download.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Output filename for a flattened export: the score's title, or the
/// generic fallback when untitled.
#[must_use]
pub fn export_filename(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_owned()
    } else {
        format!("{trimmed}.pdf")
    }
}

/// Flatten every page of the document and assemble the result.
///
/// `content` should come from the engine's export view so an in-flight
/// stroke and unsaved text edits are included.
pub async fn export(
    renderer: &impl ScoreRenderer,
    encoder: &impl DocumentEncoder,
    content: &NotationContent,
    title: &str,
    font: Option<&FontArc>,
) -> Result<ExportedDocument, ExportError> {
    let page_count = renderer.page_count();
    let mut pages = Vec::with_capacity(page_count as usize);

    for page in 0..page_count {
        let mut raster = renderer
            .render_page(page, EXPORT_SCALE)
            .await
            .map_err(|source| ExportError::Render { page, source })?;
        composite_page(&mut raster, content, page, font);
        pages.push(raster);
    }

    let bytes = encoder.encode(&pages, EXPORT_PAGE_SIZE).await?;
    let filename = export_filename(title);
    info!(pages = pages.len(), filename = %filename, "export assembled");

    Ok(ExportedDocument { filename, bytes })
}
