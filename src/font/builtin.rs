//! Advance widths for the built-in faces.
//!
//! Standard AFM metrics for Helvetica and Helvetica-Bold in 1/1000 em.
//! These are the numbers every PDF viewer ships for the non-embedded Type1
//! fonts, which is what makes width math against them safe.

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENDER: i16 = 718;
pub const DESCENDER: i16 = -207;

/// Advance width of `ch` in 1/1000 em units.
pub fn advance(ch: char, bold: bool) -> u16 {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) {
        let table = if bold { &BOLD } else { &REGULAR };
        return table[(cp - 0x20) as usize];
    }
    // The handful of typographic characters the back side can emit.
    match ch {
        '\u{2014}' => 1000, // em dash
        '\u{2013}' => 556,  // en dash
        '\u{2018}' | '\u{2019}' => if bold { 278 } else { 222 },
        '\u{201C}' | '\u{201D}' => if bold { 500 } else { 333 },
        '\u{2026}' => 1000, // ellipsis
        // Unknown code points draw as '?' after WinAnsi mapping; use the
        // figure width so estimates stay conservative.
        _ => 556,
    }
}

// Helvetica, chars 0x20..=0x7E.
const REGULAR: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

// Helvetica-Bold, chars 0x20..=0x7E.
const BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
