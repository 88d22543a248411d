//! Shrink-to-fit font sizing.
//!
//! Every front word starts at the design ceiling and only shrinks as far as
//! the measured width demands: a proportional first guess, then single-point
//! fine-tuning, then a small length-keyed safety shrink. Short words stay
//! huge. That is the whole point of the sheet.

use crate::font::{FontLibrary, Weight};

/// The largest size the design ever uses, in points.
pub const MAX_FONT_SIZE: u32 = 250;
/// Hard floor. Words that still overflow here print overflowing rather
/// than shrinking into illegibility.
pub const MIN_FONT_SIZE: u32 = 40;

// Empirical safety shrink per length tier. Tuning values, not derived.
const SHRINK_MEDIUM: f64 = 0.995;
const SHRINK_LONG: f64 = 0.99;

/// Largest integer font size at which `text` fits inside `max_width_mm`,
/// bounded by [`MAX_FONT_SIZE`] and [`MIN_FONT_SIZE`].
///
/// The face is selected from the text before any measurement, and the same
/// choice is used for every measurement in the loop; measuring with the
/// wrong face gives wrong widths.
pub fn fit_size(fonts: &FontLibrary, text: &str, max_width_mm: f64) -> u32 {
    let choice = fonts.select_for(text, Weight::Bold);

    let mut size = MAX_FONT_SIZE;
    let mut width = fonts.measure_mm(text, choice, size as f64);

    if width > max_width_mm {
        // One-shot proportional estimate, then fine-tune a point at a time:
        // hinting and rounding make width slightly non-linear in size.
        size = ((max_width_mm / width) * size as f64).floor() as u32;
        size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        width = fonts.measure_mm(text, choice, size as f64);
        while width > max_width_mm && size > MIN_FONT_SIZE {
            size -= 1;
            width = fonts.measure_mm(text, choice, size as f64);
        }
    }

    // Length-tiered safety shrink: nothing for short words, 0.5% for medium,
    // 1% for long. Floored, and never below the hard floor.
    let len = text.chars().count();
    let shrunk = if len > 6 {
        (size as f64 * SHRINK_LONG).floor() as u32
    } else if len > 3 {
        (size as f64 * SHRINK_MEDIUM).floor() as u32
    } else {
        size
    };
    shrunk.max(MIN_FONT_SIZE)
}
