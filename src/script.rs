//! Unicode script classification driving font substitution.
//!
//! A word renders with whichever face can actually draw it: the CJK face for
//! Chinese, the Latin-extended face for pinyin with tone marks, the built-in
//! face for plain ASCII. Classification is a pure function of the string's
//! code points, never of its position in the selection.

/// The script class of a text string, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Contains at least one CJK Unified Ideograph.
    Cjk,
    /// No CJK, but contains Latin Extended or combining diacritical marks.
    LatinDiacritic,
    /// Everything else, including the empty string.
    Ascii,
}

/// Classify a string for font selection.
pub fn classify(text: &str) -> Script {
    if text.chars().any(is_core_cjk) {
        Script::Cjk
    } else if text.chars().any(is_latin_diacritic) {
        Script::LatinDiacritic
    } else {
        Script::Ascii
    }
}

/// The wider "has any Chinese" check used to gate generation on the CJK
/// face and to pick the back-side content policy. Covers the core block
/// plus Extension A/B and the compatibility block, where [`classify`]
/// only looks at the core block.
pub fn has_cjk(text: &str) -> bool {
    text.chars().any(|ch| {
        matches!(
            ch as u32,
            0x3400..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF
        )
    })
}

// CJK Unified Ideographs, U+4E00..U+9FFF.
fn is_core_cjk(ch: char) -> bool {
    matches!(ch as u32, 0x4E00..=0x9FFF)
}

// Latin Extended-A/B through the combining diacritical marks,
// U+0100..U+036F. Covers ā á ǎ à and friends.
fn is_latin_diacritic(ch: char) -> bool {
    matches!(ch as u32, 0x0100..=0x036F)
}
