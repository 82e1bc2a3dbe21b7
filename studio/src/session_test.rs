use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use overlay::doc::NotationContent;
use overlay::input::Mode;
use overlay::layout::{PageLayout, Point};

use super::*;
use crate::export::EncodeError;
use crate::notation::{NotationRecord, NotationStore, StoreError};
use crate::renderer::RenderError;

const WHITE: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const RED: Rgba<u8> = Rgba([0xff, 0x00, 0x00, 0xff]);

// =============================================================
// Fakes
// =============================================================

#[derive(Clone)]
struct FakeDirectory {
    score: Option<Score>,
}

impl FakeDirectory {
    fn with_title(title: &str) -> Self {
        Self {
            score: Some(Score {
                id: "partitura-1".to_owned(),
                title: title.to_owned(),
                pdf_url: Some("https://scores.example/partitura-1.pdf".to_owned()),
                last_modified: None,
            }),
        }
    }
}

impl ScoreDirectory for FakeDirectory {
    async fn get_score(&self, _id: &str) -> Result<Score, ScoreError> {
        self.score
            .clone()
            .ok_or(ScoreError::Status(reqwest::StatusCode::NOT_FOUND))
    }
}

/// In-memory notation storage shared across sessions via clone.
#[derive(Clone, Default)]
struct FakeStore {
    records: Arc<Mutex<Vec<NotationRecord>>>,
}

impl NotationStore for FakeStore {
    async fn list(&self, score_id: &str) -> Result<Vec<NotationRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.score_id == score_id)
            .cloned()
            .collect())
    }

    async fn create(&self, score_id: &str, content: &NotationContent) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let id = format!("n{}", records.len() + 1);
        records.push(NotationRecord {
            id,
            score_id: score_id.to_owned(),
            content: serde_json::to_value(content).unwrap(),
        });
        Ok(())
    }

    async fn update(&self, _notation_id: &str, _content: &NotationContent) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Clone)]
struct FakeRenderer {
    pages: u32,
}

impl ScoreRenderer for FakeRenderer {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn render_page(&self, index: u32, scale: f32) -> Result<RgbaImage, RenderError> {
        if index >= self.pages {
            return Err(RenderError::PageOutOfRange(index));
        }
        let side = (100.0 * scale) as u32;
        Ok(RgbaImage::from_pixel(side, side, WHITE))
    }

    fn page_layout(&self) -> PageLayout {
        PageLayout::new(0.0, 0.0, 1000.0, 1000.0)
    }

    async fn wait_layout_settled(&self, _index: u32) {}
}

#[derive(Clone, Default)]
struct CapturingEncoder {
    pages: Arc<Mutex<Vec<RgbaImage>>>,
}

impl DocumentEncoder for CapturingEncoder {
    async fn encode(
        &self,
        pages: &[RgbaImage],
        _page_size: (f64, f64),
    ) -> Result<Vec<u8>, EncodeError> {
        *self.pages.lock().unwrap() = pages.to_vec();
        Ok(b"%PDF-stub".to_vec())
    }
}

fn session_with(
    directory: FakeDirectory,
    store: FakeStore,
) -> AnnotationSession<FakeDirectory, FakeStore, FakeRenderer, CapturingEncoder> {
    AnnotationSession::new(
        "partitura-1",
        directory,
        store,
        FakeRenderer { pages: 2 },
        CapturingEncoder::default(),
    )
}

fn count_pixels(img: &RgbaImage, color: Rgba<u8>) -> usize {
    img.pixels().filter(|p| **p == color).count()
}

/// Drag a three-point stroke across the current page.
fn draw_stroke(session: &mut AnnotationSession<FakeDirectory, FakeStore, FakeRenderer, CapturingEncoder>) {
    let engine = session.engine_mut();
    engine.set_mode(Mode::Draw);
    engine.on_pointer_down(Point::new(100.0, 500.0));
    engine.on_pointer_move(Point::new(500.0, 500.0));
    engine.on_pointer_move(Point::new(900.0, 500.0));
    engine.on_pointer_up();
}

// =============================================================
// Opening
// =============================================================

#[tokio::test]
async fn open_resolves_score_metadata() {
    let mut session = session_with(FakeDirectory::with_title("Nocturne"), FakeStore::default());
    let score = session.open().await.unwrap();
    assert_eq!(score.title, "Nocturne");
    assert!(session.score().is_some());
}

#[tokio::test]
async fn open_fails_without_pdf_source() {
    let mut directory = FakeDirectory::with_title("Nocturne");
    directory.score.as_mut().unwrap().pdf_url = None;
    let mut session = session_with(directory, FakeStore::default());
    assert!(matches!(session.open().await, Err(SessionError::NoSource)));
}

#[tokio::test]
async fn open_propagates_missing_score() {
    let mut session = session_with(FakeDirectory { score: None }, FakeStore::default());
    assert!(matches!(session.open().await, Err(SessionError::Score(_))));
}

#[tokio::test]
async fn session_requests_full_viewport() {
    let session = session_with(FakeDirectory::with_title("x"), FakeStore::default());
    assert!(session.full_viewport());
}

// =============================================================
// Document load
// =============================================================

#[tokio::test]
async fn document_load_installs_settled_layout() {
    let mut session = session_with(FakeDirectory::with_title("x"), FakeStore::default());
    session.open().await.unwrap();
    session.on_document_load().await;
    assert_eq!(session.engine().layout, Some(PageLayout::new(0.0, 0.0, 1000.0, 1000.0)));
}

#[tokio::test]
async fn document_load_with_empty_storage_starts_empty() {
    let mut session = session_with(FakeDirectory::with_title("x"), FakeStore::default());
    session.open().await.unwrap();
    session.on_document_load().await;
    assert!(session.engine().doc.is_empty());
}

// =============================================================
// Save / reload round trip
// =============================================================

#[tokio::test]
async fn save_then_reload_restores_markup() {
    let store = FakeStore::default();
    let directory = FakeDirectory::with_title("Nocturne");

    let mut first = session_with(directory.clone(), store.clone());
    first.open().await.unwrap();
    first.on_document_load().await;
    draw_stroke(&mut first);
    let saved = first.engine().doc.snapshot();
    first.save().await.unwrap();

    let mut second = session_with(directory, store);
    second.open().await.unwrap();
    second.on_document_load().await;
    assert_eq!(second.engine().doc.snapshot(), saved);
}

// =============================================================
// Export
// =============================================================

#[tokio::test]
async fn export_uses_score_title() {
    let mut session = session_with(FakeDirectory::with_title("Nocturne"), FakeStore::default());
    session.open().await.unwrap();
    session.on_document_load().await;
    let doc = session.export().await.unwrap();
    assert_eq!(doc.filename, "Nocturne.pdf");
}

#[tokio::test]
async fn export_before_open_uses_fallback_name() {
    let session = session_with(FakeDirectory::with_title("x"), FakeStore::default());
    let doc = session.export().await.unwrap();
    assert_eq!(doc.filename, "partitura.pdf");
}

#[tokio::test]
async fn export_keeps_pages_isolated_across_navigation() {
    // Draw on page 0, visit page 1 and draw there, come back, export:
    // each exported page carries exactly its own stroke.
    let encoder = CapturingEncoder::default();
    let mut session = AnnotationSession::new(
        "partitura-1",
        FakeDirectory::with_title("x"),
        FakeStore::default(),
        FakeRenderer { pages: 2 },
        encoder.clone(),
    );
    session.open().await.unwrap();
    session.on_document_load().await;

    session.engine_mut().set_draw_color("#ff0000");
    draw_stroke(&mut session);
    session.on_page_change(1).await;
    session.engine_mut().set_draw_color("#0000ff");
    draw_stroke(&mut session);
    session.on_page_change(0).await;

    session.export().await.unwrap();

    let blue = Rgba([0x00, 0x00, 0xff, 0xff]);
    let pages = encoder.pages.lock().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(count_pixels(&pages[0], RED) > 0);
    assert_eq!(count_pixels(&pages[0], blue), 0);
    assert!(count_pixels(&pages[1], blue) > 0);
    assert_eq!(count_pixels(&pages[1], RED), 0);
}

#[tokio::test]
async fn export_includes_in_flight_stroke() {
    let encoder = CapturingEncoder::default();
    let mut session = AnnotationSession::new(
        "partitura-1",
        FakeDirectory::with_title("x"),
        FakeStore::default(),
        FakeRenderer { pages: 2 },
        encoder.clone(),
    );
    session.open().await.unwrap();
    session.on_document_load().await;

    // Start drawing and export mid-gesture.
    let engine = session.engine_mut();
    engine.set_mode(Mode::Draw);
    engine.set_draw_color("#ff0000");
    engine.on_pointer_down(Point::new(100.0, 500.0));
    engine.on_pointer_move(Point::new(900.0, 500.0));

    session.export().await.unwrap();
    let pages = encoder.pages.lock().unwrap();
    assert!(count_pixels(&pages[0], RED) > 0);
}
