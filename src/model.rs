//! # Input Model
//!
//! Cards, sets, the print job, and the read-only card store. This is the
//! data a selection UI hands over; the engine never mutates it. Designed to
//! be easily produced by a web front end or direct JSON construction.

use serde::{Deserialize, Serialize};

use crate::font::FontKind;

/// One flashcard as the store supplies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Opaque unique identifier.
    pub id: String,
    /// The word rendered large on the front.
    pub word: String,
    /// Optional English meaning, shown on the back.
    #[serde(default)]
    pub gloss: String,
    /// Optional phonetic rendering (pinyin with tone marks).
    #[serde(default)]
    pub transliteration: String,
    /// Opaque category reference, display-only.
    #[serde(default)]
    pub category_id: String,
}

/// A named, ordered group of cards selectable as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: String,
    pub name: String,
    pub card_ids: Vec<String>,
}

/// Which side the preview shows. Affects only the projector, never the PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    #[default]
    Front,
    Back,
}

/// The full unit of work a user selection produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    /// Ordered, explicitly selected card IDs.
    #[serde(default)]
    pub card_ids: Vec<String>,
    /// Selected set IDs, expanded (in order, de-duplicated) after the
    /// explicit IDs.
    #[serde(default)]
    pub set_ids: Vec<String>,
    /// Append a matching back page per front page.
    #[serde(default)]
    pub include_back: bool,
    /// Preview-side toggle.
    #[serde(default)]
    pub preview_side: Side,
}

/// A card with its computed front font size, fixed from generation time
/// until the job is regenerated.
#[derive(Debug, Clone)]
pub struct SizedCard {
    pub card: Card,
    pub font_size: u32,
}

/// One physical sheet: slot 0 is the top half, slot 1 the bottom half
/// (absent when the selection count is odd).
#[derive(Debug, Clone, Default)]
pub struct SheetPage {
    pub slots: Vec<SizedCard>,
}

impl SheetPage {
    pub fn has_both(&self) -> bool {
        self.slots.len() > 1
    }
}

/// Read-only card store: the engine looks cards up, nothing more.
#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    sets: Vec<CardSet>,
}

impl CardStore {
    pub fn new(cards: Vec<Card>, sets: Vec<CardSet>) -> Self {
        Self { cards, sets }
    }

    pub fn lookup(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn set(&self, id: &str) -> Option<&CardSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    /// Expand set selections into card IDs, preserving selection order and
    /// dropping duplicates. Unknown set IDs are skipped.
    pub fn expand_sets(&self, set_ids: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for set_id in set_ids {
            let Some(set) = self.set(set_id) else {
                log::debug!("dropping unknown set id {set_id}");
                continue;
            };
            for card_id in &set.card_ids {
                if !out.contains(card_id) {
                    out.push(card_id.clone());
                }
            }
        }
        out
    }
}

/// Where to fetch a font program from: an `http(s)://` URL or a file path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSource {
    pub kind: FontKind,
    pub src: String,
}

/// The complete job document the CLI consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDocument {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub sets: Vec<CardSet>,
    pub job: PrintJob,
    #[serde(default)]
    pub fonts: Vec<FontSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            word: id.to_string(),
            gloss: String::new(),
            transliteration: String::new(),
            category_id: String::new(),
        }
    }

    #[test]
    fn lookup_misses_return_none() {
        let store = CardStore::new(vec![card("a")], vec![]);
        assert!(store.lookup("a").is_some());
        assert!(store.lookup("b").is_none());
    }

    #[test]
    fn set_expansion_preserves_order_and_dedups() {
        let sets = vec![
            CardSet {
                id: "s1".to_string(),
                name: "Day 1".to_string(),
                card_ids: vec!["a".to_string(), "b".to_string()],
            },
            CardSet {
                id: "s2".to_string(),
                name: "Day 2".to_string(),
                card_ids: vec!["b".to_string(), "c".to_string()],
            },
        ];
        let store = CardStore::new(vec![], sets);
        let ids = store.expand_sets(&["s1".to_string(), "s2".to_string()]);
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_sets_are_skipped() {
        let store = CardStore::new(vec![], vec![]);
        assert!(store.expand_sets(&["nope".to_string()]).is_empty());
    }

    #[test]
    fn job_document_parses_with_defaults() {
        let json = r#"{
            "cards": [{ "id": "1", "word": "cat" }],
            "job": { "cardIds": ["1"] }
        }"#;
        let doc: JobDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.cards[0].gloss, "");
        assert!(!doc.job.include_back);
        assert_eq!(doc.job.preview_side, Side::Front);
        assert!(doc.fonts.is_empty());
    }
}
