//! # Preview Projector
//!
//! Projects paginated cards into a screen-friendly description of each
//! sheet, for a UI to draw without parsing the PDF. The projection reuses
//! the exact page split and fitted sizes the PDF gets, so what the preview
//! shows is what prints.

use serde::Serialize;

use crate::geometry;
use crate::model::{SheetPage, Side};
use crate::render::EM_DASH;
use crate::script;

/// Print-point sizes divide by this to get on-screen pixels.
const SCALE_DIVISOR: f64 = 3.0;
/// Ceiling for the projected front-word size in pixels.
const MAX_FONT_PX: f64 = 100.0;

/// A whole print job projected for one side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDoc {
    pub side: Side,
    /// Width over height of the printed sheet.
    pub aspect_ratio: f64,
    pub pages: Vec<PreviewPage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPage {
    /// 1-based sheet number.
    pub number: usize,
    /// Whether the horizontal cut line is drawn (both slots occupied).
    pub divider: bool,
    pub halves: Vec<PreviewHalf>,
}

/// The content of one card slot, top half first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum PreviewHalf {
    /// Front side: the oversized red word.
    Front { text: String, font_px: f64 },
    /// Back of an English-only card: just the gloss.
    BackGloss { gloss: String },
    /// Back of a Chinese card: gloss, word, and transliteration lines.
    BackStack {
        gloss: String,
        word: String,
        transliteration: String,
    },
}

/// Project `pages` for on-screen display of the given side.
pub fn project(pages: &[SheetPage], side: Side) -> PreviewDoc {
    let projected = pages
        .iter()
        .enumerate()
        .map(|(i, page)| PreviewPage {
            number: i + 1,
            divider: page.has_both(),
            halves: page
                .slots
                .iter()
                .map(|sized| match side {
                    Side::Front => PreviewHalf::Front {
                        text: sized.card.word.clone(),
                        font_px: (sized.font_size as f64 / SCALE_DIVISOR).min(MAX_FONT_PX),
                    },
                    Side::Back => back_half(sized),
                })
                .collect(),
        })
        .collect();

    PreviewDoc {
        side,
        aspect_ratio: geometry::aspect_ratio(),
        pages: projected,
    }
}

/// Mirror of the renderer's back-side content policy.
fn back_half(sized: &crate::model::SizedCard) -> PreviewHalf {
    let word = sized.card.word.trim();
    let gloss = sized.card.gloss.trim();
    let transliteration = sized.card.transliteration.trim();

    if !gloss.is_empty() && !script::has_cjk(word) {
        PreviewHalf::BackGloss {
            gloss: gloss.to_string(),
        }
    } else {
        PreviewHalf::BackStack {
            gloss: or_dash(gloss),
            word: or_dash(word),
            transliteration: or_dash(transliteration),
        }
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        EM_DASH.to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, SizedCard};

    fn sized(word: &str, gloss: &str, transliteration: &str, font_size: u32) -> SizedCard {
        SizedCard {
            card: Card {
                id: word.to_string(),
                word: word.to_string(),
                gloss: gloss.to_string(),
                transliteration: transliteration.to_string(),
                category_id: String::new(),
            },
            font_size,
        }
    }

    fn page(slots: Vec<SizedCard>) -> SheetPage {
        SheetPage { slots }
    }

    #[test]
    fn front_size_is_a_third_of_print_points() {
        let doc = project(&[page(vec![sized("mountain", "", "", 240)])], Side::Front);
        match &doc.pages[0].halves[0] {
            PreviewHalf::Front { text, font_px } => {
                assert_eq!(text, "mountain");
                assert_eq!(*font_px, 80.0);
            }
            other => panic!("expected front half, got {other:?}"),
        }
    }

    #[test]
    fn ceiling_sized_word_projects_below_the_cap() {
        // 250 / 3 stays under the 100 px cap, so the divisor alone decides.
        let doc = project(&[page(vec![sized("cat", "", "", 250)])], Side::Front);
        match &doc.pages[0].halves[0] {
            PreviewHalf::Front { font_px, .. } => assert_eq!(*font_px, 250.0 / 3.0),
            other => panic!("expected front half, got {other:?}"),
        }
    }

    #[test]
    fn oversized_card_projects_at_the_cap() {
        // No sizing path produces more than 250 pt today; the cap guards the
        // projection against whatever a caller hands it.
        let doc = project(&[page(vec![sized("cat", "", "", 400)])], Side::Front);
        match &doc.pages[0].halves[0] {
            PreviewHalf::Front { font_px, .. } => assert_eq!(*font_px, 100.0),
            other => panic!("expected front half, got {other:?}"),
        }
    }

    #[test]
    fn divider_mirrors_slot_occupancy() {
        let pages = [
            page(vec![sized("cat", "", "", 250), sized("dog", "", "", 250)]),
            page(vec![sized("horse", "", "", 250)]),
        ];
        let doc = project(&pages, Side::Front);
        assert!(doc.pages[0].divider);
        assert!(!doc.pages[1].divider);
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[1].number, 2);
    }

    #[test]
    fn english_card_back_is_gloss_only() {
        let doc = project(&[page(vec![sized("cat", "a small pet", "", 250)])], Side::Back);
        match &doc.pages[0].halves[0] {
            PreviewHalf::BackGloss { gloss } => assert_eq!(gloss, "a small pet"),
            other => panic!("expected gloss-only back, got {other:?}"),
        }
    }

    #[test]
    fn chinese_card_back_is_a_stack_with_dash_fill() {
        let doc = project(&[page(vec![sized("猫", "cat", "", 250)])], Side::Back);
        match &doc.pages[0].halves[0] {
            PreviewHalf::BackStack {
                gloss,
                word,
                transliteration,
            } => {
                assert_eq!(gloss, "cat");
                assert_eq!(word, "猫");
                assert_eq!(transliteration, EM_DASH);
            }
            other => panic!("expected back stack, got {other:?}"),
        }
    }

    #[test]
    fn glossless_english_card_falls_back_to_the_stack() {
        let doc = project(&[page(vec![sized("cat", "", "", 250)])], Side::Back);
        assert!(matches!(
            doc.pages[0].halves[0],
            PreviewHalf::BackStack { .. }
        ));
    }

    #[test]
    fn aspect_ratio_is_landscape() {
        let doc = project(&[], Side::Front);
        assert!((doc.aspect_ratio - 297.0 / 210.0).abs() < 1e-9);
    }
}
