//! Grouping sized cards onto sheets, two per page.
//!
//! Strictly consecutive, strictly in input order. Any filtering (by
//! category, by availability) happens before this stage.

use crate::model::{SheetPage, SizedCard};

/// Cards per physical sheet.
pub const CARDS_PER_PAGE: usize = 2;

/// Group `cards` into pages of [`CARDS_PER_PAGE`], preserving order. The
/// final page holds a single card iff the input length is odd.
pub fn paginate(cards: Vec<SizedCard>) -> Vec<SheetPage> {
    cards
        .chunks(CARDS_PER_PAGE)
        .map(|chunk| SheetPage {
            slots: chunk.to_vec(),
        })
        .collect()
}
