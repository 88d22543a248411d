//! # Recto
//!
//! A flashcard sheet layout engine.
//!
//! Most card printers lay words out at a fixed size and let long words spill
//! off the sheet, or wrap them into illegible stacks. Recto does neither:
//! **every front word is fitted.** Each word starts at the largest size the
//! sheet allows and shrinks, first proportionally against its measured
//! width and then by length tier, until it fits the printable width,
//! never dropping below the legibility floor.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Cards, sets, print job
//!       ↓
//!   [sizing]   — Script-aware font selection + fit sizing
//!       ↓
//!   [paginate] — Two cards per A4 landscape sheet
//!       ↓
//!   [render]   — Absolute-position draw ops per page
//!       ↓
//!   [pdf]      — Serialize to PDF bytes
//! ```
//!
//! The same paginated pages also feed [`preview::project`], so the on-screen
//! preview and the printed sheet can never disagree about page splits or
//! fitted sizes.

pub mod error;
pub mod font;
pub mod geometry;
pub mod model;
pub mod paginate;
pub mod pdf;
pub mod preview;
pub mod render;
pub mod script;
pub mod sizing;

use std::io::Read;

use error::RectoError;
use font::{FontKind, FontLibrary};
use model::{CardStore, FontSource, JobDocument, PrintJob, SheetPage, Side, SizedCard};
use pdf::PdfWriter;

/// Default output file name for generated sheets.
pub const OUTPUT_FILE_NAME: &str = "flashcards.pdf";

/// Resolve a print job against the store: expand sets, size every word, and
/// split the result into sheets.
///
/// This is the shared front half of both [`write_pdf`] and the preview;
/// whatever pages it produces are the pages that print.
pub fn layout_job(
    store: &CardStore,
    job: &PrintJob,
    fonts: &FontLibrary,
) -> Result<Vec<SheetPage>, RectoError> {
    let mut ids: Vec<String> = Vec::new();
    for id in job.card_ids.iter().chain(store.expand_sets(&job.set_ids).iter()) {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    if ids.is_empty() {
        return Err(RectoError::EmptySelection);
    }

    let cards: Vec<_> = ids
        .iter()
        .filter_map(|id| {
            let card = store.lookup(id);
            if card.is_none() {
                log::debug!("skipping unknown card id {id}");
            }
            card
        })
        .collect();
    if cards.is_empty() {
        return Err(RectoError::EmptySelection);
    }

    // A Chinese word printed before its face arrives would silently fall
    // back to a face with no CJK glyphs, so the job is refused instead.
    if cards.iter().any(|card| script::has_cjk(&card.word)) && !fonts.is_ready(FontKind::Cjk) {
        return Err(RectoError::FontNotReady(FontKind::Cjk));
    }

    let max_width = geometry::max_text_width_mm();
    let sized = cards
        .into_iter()
        .map(|card| SizedCard {
            font_size: sizing::fit_size(fonts, &card.word, max_width),
            card: card.clone(),
        })
        .collect();

    Ok(paginate::paginate(sized))
}

/// Render sheets to PDF bytes: fronts first, then backs when requested.
pub fn write_pdf(
    pages: &[SheetPage],
    include_back: bool,
    fonts: &FontLibrary,
) -> Result<Vec<u8>, RectoError> {
    let draw_pages = render::render(pages, include_back, fonts);
    PdfWriter::new().write(&draw_pages, fonts)
}

/// Project sheets for on-screen preview of one side.
pub fn preview_job(pages: &[SheetPage], side: Side) -> preview::PreviewDoc {
    preview::project(pages, side)
}

/// Render a whole job described as JSON to PDF bytes.
///
/// This is the primary entry point for the CLI. The document carries its own
/// cards, sets, job parameters, and font sources.
pub fn render_job_json(json: &str, fonts: &FontLibrary) -> Result<Vec<u8>, RectoError> {
    let doc: JobDocument = serde_json::from_str(json)?;
    load_fonts(&doc.fonts, fonts);
    let store = CardStore::new(doc.cards, doc.sets);
    let pages = layout_job(&store, &doc.job, fonts)?;
    write_pdf(&pages, doc.job.include_back, fonts)
}

/// Load every declared font source into the library. Failures are logged by
/// the library and leave the slot unavailable; whether that blocks the job
/// depends on the words being printed.
pub fn load_fonts(sources: &[FontSource], fonts: &FontLibrary) {
    for source in sources {
        fonts.load_with(source.kind, || fetch_font(&source.src));
    }
}

/// Fetch font bytes from an `http(s)` URL or a filesystem path.
fn fetch_font(src: &str) -> Result<Vec<u8>, RectoError> {
    if src.starts_with("http://") || src.starts_with("https://") {
        let response = ureq::get(src)
            .call()
            .map_err(|e| RectoError::Font(format!("fetching {src}: {e}")))?;
        let mut data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut data)
            .map_err(|e| RectoError::Font(format!("reading {src}: {e}")))?;
        Ok(data)
    } else {
        std::fs::read(src).map_err(|e| RectoError::Font(format!("reading {src}: {e}")))
    }
}

// Re-exported so embedders can name the selection result without digging
// through modules.
pub use font::FontChoice;
pub use preview::{PreviewDoc, PreviewHalf, PreviewPage};
