//! Shared page geometry for the printed sheet and the on-screen preview.
//!
//! One module owns the physical format, margins, halves, midline, and
//! per-slot anchor points. Both the layout renderer and the preview
//! projector consume these, so the two can never silently drift apart.
//!
//! Units are millimetres throughout; conversion to PDF points happens at
//! the serializer boundary.

/// A4 landscape.
pub const PAGE_WIDTH_MM: f64 = 297.0;
pub const PAGE_HEIGHT_MM: f64 = 210.0;

/// Fixed page margin on each side. Narrow on purpose: the front word is
/// meant to fill the sheet.
pub const MARGIN_MM: f64 = 8.0;

/// Right inset and per-slot top offset for the back-side text stack.
pub const BACK_INSET_MM: f64 = 20.0;
/// Vertical step between stacked back-side lines.
pub const BACK_LINE_STEP_MM: f64 = 16.0;

/// Stroke width of the divider between the two card halves.
pub const DIVIDER_WIDTH_MM: f64 = 0.1;

/// Which half of the page a card occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Top,
    Bottom,
}

impl Slot {
    pub fn from_index(index: usize) -> Slot {
        if index == 0 {
            Slot::Top
        } else {
            Slot::Bottom
        }
    }
}

/// The width a front word must fit inside.
pub fn max_text_width_mm() -> f64 {
    PAGE_WIDTH_MM - 2.0 * MARGIN_MM
}

/// Front-side anchor: horizontal centre of the page, vertical centre of the
/// slot's half (one quarter and three quarters of the page height).
pub fn front_anchor_mm(slot: Slot) -> (f64, f64) {
    let y = match slot {
        Slot::Top => PAGE_HEIGHT_MM / 4.0,
        Slot::Bottom => PAGE_HEIGHT_MM * 3.0 / 4.0,
    };
    (PAGE_WIDTH_MM / 2.0, y)
}

/// Back-side base line: a fixed inset below the slot's top edge rather
/// than centred in the half.
pub fn back_base_y_mm(slot: Slot) -> f64 {
    match slot {
        Slot::Top => BACK_INSET_MM,
        Slot::Bottom => PAGE_HEIGHT_MM / 2.0 + BACK_INSET_MM,
    }
}

/// Right-aligned anchor for the back-side text stack.
pub fn back_right_x_mm() -> f64 {
    PAGE_WIDTH_MM - BACK_INSET_MM
}

/// The exact vertical midpoint, where the divider is drawn.
pub fn mid_y_mm() -> f64 {
    PAGE_HEIGHT_MM / 2.0
}

/// Width over height; the preview container keeps this ratio.
pub fn aspect_ratio() -> f64 {
    PAGE_WIDTH_MM / PAGE_HEIGHT_MM
}
