//! # Font Management
//!
//! Loading, selecting, and measuring the faces a flashcard sheet needs:
//! a CJK-capable face for Chinese words, a Latin-extended face for pinyin
//! with tone marks, and a built-in Helvetica fallback for plain ASCII.
//!
//! Faces are downloaded once per process into a [`FontLibrary`], each slot
//! write-once. Selection is driven entirely by the script classifier, so
//! the face a string measures with is always the face it prints with.

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};

use crate::error::RectoError;
use crate::script::{self, Script};

/// Points per millimetre. Page geometry is in millimetres, font sizes in
/// points; this is the bridge.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// The two loadable face slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontKind {
    /// CJK-capable face (e.g. Noto Sans SC).
    Cjk,
    /// Latin face with full diacritic coverage (e.g. Noto Sans).
    LatinExt,
}

impl fmt::Display for FontKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontKind::Cjk => write!(f, "CJK"),
            FontKind::LatinExt => write!(f, "Latin-extended"),
        }
    }
}

/// Requested weight. Only the built-in face has a bold variant; the loaded
/// faces always render at normal weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Normal,
    Bold,
}

/// The face a piece of text will actually render with.
///
/// Every draw op and every measurement carries its own `FontChoice`, so a
/// stale selection can never leak from one word into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontChoice {
    /// One of the loaded faces, always at normal weight.
    Face(FontKind),
    /// The built-in Helvetica at the requested weight.
    Builtin(Weight),
}

/// Vertical metrics for baseline math, in font units.
#[derive(Debug, Clone, Copy)]
pub struct VMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub units_per_em: u16,
}

/// Parsed metrics from a TrueType/OpenType face.
///
/// The advance and glyph-id maps are precomputed from the cmap once at load
/// time; measurement afterwards is pure table lookups.
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    advance_widths: HashMap<char, u16>,
    default_advance: u16,
    glyph_ids: HashMap<char, u16>,
}

impl FaceMetrics {
    pub fn parse(data: &[u8]) -> Result<Self, RectoError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| RectoError::Font(format!("failed to parse font program: {e}")))?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();

        // Walk the unicode cmap subtables for the set of mapped code points,
        // then record advance and glyph id per char.
        let mut codepoints: Vec<u32> = Vec::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| codepoints.push(cp));
            }
        }

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;
        for cp in codepoints {
            let Some(ch) = char::from_u32(cp) else { continue };
            let Some(glyph_id) = face.glyph_index(ch) else { continue };
            let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            advance_widths.insert(ch, advance);
            glyph_ids.insert(ch, glyph_id.0);
            if ch == ' ' {
                default_advance = advance;
            }
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(FaceMetrics {
            units_per_em,
            ascender,
            descender,
            advance_widths,
            default_advance,
            glyph_ids,
        })
    }

    /// Advance width of a character in font units.
    pub fn advance(&self, ch: char) -> u16 {
        self.advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance)
    }

    /// Glyph id for a character; 0 (.notdef) when unmapped.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.glyph_ids.get(&ch).copied().unwrap_or(0)
    }
}

/// A loaded font program plus its parsed metrics.
pub struct LoadedFace {
    pub data: Vec<u8>,
    pub postscript_name: String,
    pub metrics: FaceMetrics,
}

impl LoadedFace {
    pub fn parse(data: Vec<u8>, kind: FontKind) -> Result<Self, RectoError> {
        let metrics = FaceMetrics::parse(&data)?;
        let postscript_name = postscript_name(&data).unwrap_or_else(|| match kind {
            FontKind::Cjk => "CJKFace".to_string(),
            FontKind::LatinExt => "LatinFace".to_string(),
        });
        Ok(LoadedFace {
            data,
            postscript_name,
            metrics,
        })
    }
}

fn postscript_name(data: &[u8]) -> Option<String> {
    let face = ttf_parser::Face::parse(data, 0).ok()?;
    face.names()
        .into_iter()
        .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .and_then(|name| name.to_string())
}

/// Process-wide cache of loaded faces.
///
/// Each slot is write-once: the first `load_with` per kind runs the fetch,
/// concurrent callers block on that same initialization, and later calls
/// are no-ops. A failed fetch or parse is logged and leaves the slot
/// permanently unavailable; selection then falls back to the built-in
/// face rather than erroring.
pub struct FontLibrary {
    cjk: OnceCell<Option<Arc<LoadedFace>>>,
    latin: OnceCell<Option<Arc<LoadedFace>>>,
}

static GLOBAL: Lazy<FontLibrary> = Lazy::new(FontLibrary::new);

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        Self {
            cjk: OnceCell::new(),
            latin: OnceCell::new(),
        }
    }

    /// The process-wide library used by the CLI. Embedders and tests can
    /// construct their own with [`FontLibrary::new`].
    pub fn global() -> &'static FontLibrary {
        &GLOBAL
    }

    fn slot(&self, kind: FontKind) -> &OnceCell<Option<Arc<LoadedFace>>> {
        match kind {
            FontKind::Cjk => &self.cjk,
            FontKind::LatinExt => &self.latin,
        }
    }

    /// Load a face once, fetching the bytes with `fetch`. Returns whether
    /// the face is available afterwards.
    pub fn load_with<F>(&self, kind: FontKind, fetch: F) -> bool
    where
        F: FnOnce() -> Result<Vec<u8>, RectoError>,
    {
        self.slot(kind)
            .get_or_init(|| match fetch().and_then(|data| LoadedFace::parse(data, kind)) {
                Ok(face) => {
                    log::debug!("{kind} face loaded: {}", face.postscript_name);
                    Some(Arc::new(face))
                }
                Err(e) => {
                    log::warn!("{kind} face unavailable: {e}");
                    None
                }
            })
            .is_some()
    }

    /// Install already-fetched font bytes.
    pub fn install(&self, kind: FontKind, data: Vec<u8>) -> bool {
        self.load_with(kind, || Ok(data))
    }

    /// Whether the face bytes for `kind` have finished loading.
    pub fn is_ready(&self, kind: FontKind) -> bool {
        matches!(self.slot(kind).get(), Some(Some(_)))
    }

    pub fn face(&self, kind: FontKind) -> Option<&LoadedFace> {
        match self.slot(kind).get() {
            Some(Some(face)) => Some(face),
            _ => None,
        }
    }

    /// Pick the face a string renders with.
    ///
    /// CJK text gets the CJK face when it is ready, diacritic Latin gets the
    /// Latin-extended face; both only exist at normal weight, so the
    /// requested weight applies to the built-in fallback alone. Forcing
    /// normal there avoids a wrong-width synthetic bold.
    pub fn select_for(&self, text: &str, weight: Weight) -> FontChoice {
        match script::classify(text) {
            Script::Cjk if self.is_ready(FontKind::Cjk) => FontChoice::Face(FontKind::Cjk),
            Script::LatinDiacritic if self.is_ready(FontKind::LatinExt) => {
                FontChoice::Face(FontKind::LatinExt)
            }
            _ => FontChoice::Builtin(weight),
        }
    }

    /// Rendered width of `text` at `size_pt` points, in millimetres.
    pub fn measure_mm(&self, text: &str, choice: FontChoice, size_pt: f64) -> f64 {
        let em_width: f64 = match choice {
            FontChoice::Face(kind) => match self.face(kind) {
                Some(face) => text
                    .chars()
                    .map(|ch| face.metrics.advance(ch) as f64 / face.metrics.units_per_em as f64)
                    .sum(),
                // Selection never yields an unloaded face; be total anyway.
                None => builtin_em_width(text, false),
            },
            FontChoice::Builtin(weight) => builtin_em_width(text, weight == Weight::Bold),
        };
        em_width * size_pt / PT_PER_MM
    }

    /// Vertical metrics for baseline placement.
    pub fn v_metrics(&self, choice: FontChoice) -> VMetrics {
        match choice {
            FontChoice::Face(kind) => match self.face(kind) {
                Some(face) => VMetrics {
                    ascender: face.metrics.ascender,
                    descender: face.metrics.descender,
                    units_per_em: face.metrics.units_per_em,
                },
                None => builtin_v_metrics(),
            },
            FontChoice::Builtin(_) => builtin_v_metrics(),
        }
    }
}

fn builtin_em_width(text: &str, bold: bool) -> f64 {
    text.chars()
        .map(|ch| builtin::advance(ch, bold) as f64 / builtin::UNITS_PER_EM as f64)
        .sum()
}

fn builtin_v_metrics() -> VMetrics {
    VMetrics {
        ascender: builtin::ASCENDER,
        descender: builtin::DESCENDER,
        units_per_em: builtin::UNITS_PER_EM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_library_reports_not_ready() {
        let lib = FontLibrary::new();
        assert!(!lib.is_ready(FontKind::Cjk));
        assert!(!lib.is_ready(FontKind::LatinExt));
    }

    #[test]
    fn failed_load_is_cached_as_unavailable() {
        let lib = FontLibrary::new();
        let ok = lib.load_with(FontKind::Cjk, || {
            Err(RectoError::Font("network down".to_string()))
        });
        assert!(!ok);
        assert!(!lib.is_ready(FontKind::Cjk));
        // The slot is settled: a later, would-be-successful load is a no-op.
        let ok = lib.load_with(FontKind::Cjk, || Ok(vec![0u8; 4]));
        assert!(!ok);
    }

    #[test]
    fn garbage_bytes_leave_the_slot_unavailable() {
        let lib = FontLibrary::new();
        assert!(!lib.install(FontKind::LatinExt, b"not a font".to_vec()));
        assert!(!lib.is_ready(FontKind::LatinExt));
    }

    #[test]
    fn selection_falls_back_to_builtin() {
        let lib = FontLibrary::new();
        assert_eq!(
            lib.select_for("猫", Weight::Bold),
            FontChoice::Builtin(Weight::Bold)
        );
        assert_eq!(
            lib.select_for("māo", Weight::Normal),
            FontChoice::Builtin(Weight::Normal)
        );
        assert_eq!(
            lib.select_for("cat", Weight::Bold),
            FontChoice::Builtin(Weight::Bold)
        );
    }

    #[test]
    fn builtin_measurement_scales_linearly() {
        let lib = FontLibrary::new();
        let choice = FontChoice::Builtin(Weight::Bold);
        let w12 = lib.measure_mm("cat", choice, 12.0);
        let w24 = lib.measure_mm("cat", choice, 24.0);
        assert!(w12 > 0.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-9);
    }

    #[test]
    fn bold_builtin_is_wider() {
        let lib = FontLibrary::new();
        let regular = lib.measure_mm("WAVE", FontChoice::Builtin(Weight::Normal), 40.0);
        let bold = lib.measure_mm("WAVE", FontChoice::Builtin(Weight::Bold), 40.0);
        assert!(bold > regular);
    }

    #[test]
    fn empty_string_measures_zero() {
        let lib = FontLibrary::new();
        assert_eq!(lib.measure_mm("", FontChoice::Builtin(Weight::Bold), 250.0), 0.0);
    }
}
