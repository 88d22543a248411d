//! # Layout Renderer
//!
//! Turns paginated cards into pages of absolute-position draw ops. The ops
//! are what the PDF serializer consumes; they carry everything needed to
//! place text (position, size, alignment, baseline, color, and the face the
//! text was classified into), so no drawing state survives between ops.
//!
//! Page order is all front pages in pagination order, then (when requested)
//! one back page per front page, in the same order.

use crate::font::{FontChoice, FontLibrary, Weight};
use crate::geometry::{self, Slot};
use crate::model::SheetPage;
use crate::script;

/// An RGB color in the 0.0–1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    /// The front-word accent color.
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Anchor at the vertical centre of the glyphs.
    Middle,
    /// Anchor at the text baseline.
    Alphabetic,
}

/// One absolute-position drawing instruction.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Text {
        text: String,
        x_mm: f64,
        y_mm: f64,
        size_pt: f64,
        font: FontChoice,
        color: Color,
        align: Align,
        baseline: Baseline,
    },
    Rule {
        from: (f64, f64),
        to: (f64, f64),
        width_mm: f64,
    },
}

/// A page of draw ops, ready for serialization.
#[derive(Debug, Clone)]
pub struct DrawPage {
    pub width_mm: f64,
    pub height_mm: f64,
    pub ops: Vec<DrawOp>,
}

impl DrawPage {
    fn new() -> Self {
        DrawPage {
            width_mm: geometry::PAGE_WIDTH_MM,
            height_mm: geometry::PAGE_HEIGHT_MM,
            ops: Vec::new(),
        }
    }
}

/// Placeholder for empty back-side fields.
pub const EM_DASH: &str = "\u{2014}";

/// Back-side text sizes in points.
const GLOSS_ONLY_SIZE_PT: f64 = 16.0;
const GLOSS_LINE_SIZE_PT: f64 = 14.0;
const WORD_LINE_SIZE_PT: f64 = 18.0;
const TRANSLIT_LINE_SIZE_PT: f64 = 14.0;

/// Render `pages` into draw-op pages: fronts first, then back pages when
/// `include_back` is set.
pub fn render(pages: &[SheetPage], include_back: bool, fonts: &FontLibrary) -> Vec<DrawPage> {
    let mut out = Vec::with_capacity(pages.len() * if include_back { 2 } else { 1 });
    for page in pages {
        out.push(front_page(page, fonts));
    }
    if include_back {
        for page in pages {
            out.push(back_page(page, fonts));
        }
    }
    out
}

fn front_page(page: &SheetPage, fonts: &FontLibrary) -> DrawPage {
    let mut draw = DrawPage::new();
    for (index, sized) in page.slots.iter().enumerate() {
        let (x, y) = geometry::front_anchor_mm(Slot::from_index(index));
        let font = fonts.select_for(&sized.card.word, Weight::Bold);
        draw.ops.push(DrawOp::Text {
            text: sized.card.word.clone(),
            x_mm: x,
            y_mm: y,
            size_pt: sized.font_size as f64,
            font,
            color: Color::RED,
            align: Align::Center,
            baseline: Baseline::Middle,
        });
    }
    if page.has_both() {
        draw.ops.push(divider());
    }
    draw
}

fn back_page(page: &SheetPage, fonts: &FontLibrary) -> DrawPage {
    let mut draw = DrawPage::new();
    for (index, sized) in page.slots.iter().enumerate() {
        let slot = Slot::from_index(index);
        let base_y = geometry::back_base_y_mm(slot);
        let x = geometry::back_right_x_mm();

        let word = sized.card.word.trim();
        let gloss = sized.card.gloss.trim();
        let transliteration = sized.card.transliteration.trim();

        if !gloss.is_empty() && !script::has_cjk(word) {
            // English-only card: just the gloss, top-right.
            draw.ops.push(DrawOp::Text {
                text: gloss.to_string(),
                x_mm: x,
                y_mm: base_y,
                size_pt: GLOSS_ONLY_SIZE_PT,
                font: FontChoice::Builtin(Weight::Bold),
                color: Color::BLACK,
                align: Align::Right,
                baseline: Baseline::Alphabetic,
            });
        } else {
            // Chinese card: gloss / word / pinyin stack, each line
            // classified on its own so the pinyin line can pick up the
            // Latin-extended face for tone marks.
            let lines = [
                (
                    format!("English: {}", or_dash(gloss)),
                    GLOSS_LINE_SIZE_PT,
                    Weight::Bold,
                ),
                (
                    format!("中文: {}", or_dash(word)),
                    WORD_LINE_SIZE_PT,
                    Weight::Normal,
                ),
                (
                    format!("Pinyin: {}", or_dash(transliteration)),
                    TRANSLIT_LINE_SIZE_PT,
                    Weight::Normal,
                ),
            ];
            for (line_index, (text, size_pt, weight)) in lines.into_iter().enumerate() {
                let font = fonts.select_for(&text, weight);
                draw.ops.push(DrawOp::Text {
                    text,
                    x_mm: x,
                    y_mm: base_y + line_index as f64 * geometry::BACK_LINE_STEP_MM,
                    size_pt,
                    font,
                    color: Color::BLACK,
                    align: Align::Right,
                    baseline: Baseline::Alphabetic,
                });
            }
        }
    }
    if page.has_both() {
        draw.ops.push(divider());
    }
    draw
}

fn divider() -> DrawOp {
    let y = geometry::mid_y_mm();
    DrawOp::Rule {
        from: (0.0, y),
        to: (geometry::PAGE_WIDTH_MM, y),
        width_mm: geometry::DIVIDER_WIDTH_MM,
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        EM_DASH
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, SizedCard};

    fn sized(word: &str, gloss: &str, transliteration: &str) -> SizedCard {
        SizedCard {
            card: Card {
                id: word.to_string(),
                word: word.to_string(),
                gloss: gloss.to_string(),
                transliteration: transliteration.to_string(),
                category_id: String::new(),
            },
            font_size: 200,
        }
    }

    fn page(slots: Vec<SizedCard>) -> SheetPage {
        SheetPage { slots }
    }

    fn texts(draw: &DrawPage) -> Vec<&str> {
        draw.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn rules(draw: &DrawPage) -> usize {
        draw.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rule { .. }))
            .count()
    }

    #[test]
    fn front_page_centres_both_words_in_red() {
        let fonts = FontLibrary::new();
        let draw = front_page(&page(vec![sized("cat", "", ""), sized("dog", "", "")]), &fonts);
        assert_eq!(texts(&draw), ["cat", "dog"]);
        for op in &draw.ops {
            if let DrawOp::Text {
                x_mm,
                color,
                align,
                baseline,
                ..
            } = op
            {
                assert_eq!(*x_mm, geometry::PAGE_WIDTH_MM / 2.0);
                assert_eq!(*color, Color::RED);
                assert_eq!(*align, Align::Center);
                assert_eq!(*baseline, Baseline::Middle);
            }
        }
        assert_eq!(rules(&draw), 1);
    }

    #[test]
    fn single_card_page_has_no_divider() {
        let fonts = FontLibrary::new();
        assert_eq!(rules(&front_page(&page(vec![sized("cat", "", "")]), &fonts)), 0);
        assert_eq!(rules(&back_page(&page(vec![sized("cat", "Cat", "")]), &fonts)), 0);
    }

    #[test]
    fn english_only_card_renders_a_single_gloss_line() {
        let fonts = FontLibrary::new();
        let draw = back_page(&page(vec![sized("dog", "Dog", "")]), &fonts);
        assert_eq!(texts(&draw), ["Dog"]);
    }

    #[test]
    fn chinese_card_renders_the_three_line_stack() {
        let fonts = FontLibrary::new();
        let draw = back_page(&page(vec![sized("狗", "Dog", "gǒu")]), &fonts);
        assert_eq!(
            texts(&draw),
            ["English: Dog", "中文: 狗", "Pinyin: gǒu"]
        );
    }

    #[test]
    fn empty_fields_fall_back_to_the_em_dash() {
        let fonts = FontLibrary::new();
        let draw = back_page(&page(vec![sized("狗", "Dog", "")]), &fonts);
        assert_eq!(
            texts(&draw),
            ["English: Dog", "中文: 狗", "Pinyin: \u{2014}"]
        );
    }

    #[test]
    fn missing_gloss_forces_the_stack_even_without_cjk() {
        let fonts = FontLibrary::new();
        let draw = back_page(&page(vec![sized("dog", "", "")]), &fonts);
        assert_eq!(
            texts(&draw),
            ["English: \u{2014}", "中文: dog", "Pinyin: \u{2014}"]
        );
    }

    #[test]
    fn back_stack_is_right_anchored_in_black() {
        let fonts = FontLibrary::new();
        let draw = back_page(&page(vec![sized("狗", "Dog", "gǒu")]), &fonts);
        for op in &draw.ops {
            if let DrawOp::Text {
                x_mm, color, align, ..
            } = op
            {
                assert_eq!(*x_mm, geometry::back_right_x_mm());
                assert_eq!(*color, Color::BLACK);
                assert_eq!(*align, Align::Right);
            }
        }
    }

    #[test]
    fn back_pages_follow_all_front_pages() {
        let fonts = FontLibrary::new();
        let pages = vec![
            page(vec![sized("a", "A", ""), sized("b", "B", "")]),
            page(vec![sized("c", "C", "")]),
        ];
        let fronts_only = render(&pages, false, &fonts);
        assert_eq!(fronts_only.len(), 2);
        let with_backs = render(&pages, true, &fonts);
        assert_eq!(with_backs.len(), 4);
        // Page 3 is the back of page 1: two slots, so it has the divider.
        assert_eq!(rules(&with_backs[2]), 1);
        assert_eq!(rules(&with_backs[3]), 0);
    }
}
