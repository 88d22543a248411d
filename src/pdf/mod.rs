//! # PDF Serializer
//!
//! Takes the rendered draw-op pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. We write the raw bytes ourselves
//! because it gives us full control over the output and keeps the engine
//! self-contained. The PDF spec is verbose but the subset flashcard sheets
//! need (text, one rule per page, two embedded faces) is manageable.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! The built-in Helvetica pair uses simple Type1 references with
//! WinAnsiEncoding. The loaded CJK and Latin-extended faces are embedded
//! whole as CIDFontType2 with Identity-H encoding, five PDF objects each:
//! FontFile2, FontDescriptor, CIDFont, ToUnicode CMap, and the root Type0
//! dictionary.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::RectoError;
use crate::font::{FaceMetrics, FontChoice, FontKind, FontLibrary, Weight, PT_PER_MM};
use crate::render::{Align, Baseline, DrawOp, DrawPage};

pub struct PdfWriter;

struct PdfObject {
    data: Vec<u8>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Registered fonts in resource order: /F0, /F1, ...
    font_objects: Vec<(FontChoice, usize)>,
    /// Char -> glyph id per embedded face, for hex text encoding.
    embedded_gids: HashMap<FontKind, HashMap<char, u16>>,
}

impl PdfBuilder {
    fn font_index(&self, choice: FontChoice) -> usize {
        self.font_objects
            .iter()
            .position(|(c, _)| *c == choice)
            .unwrap_or(0)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write draw-op pages to a PDF byte vector.
    pub fn write(&self, pages: &[DrawPage], fonts: &FontLibrary) -> Result<Vec<u8>, RectoError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            embedded_gids: HashMap::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then per-page content streams and page objects
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        self.register_fonts(&mut builder, pages, fonts)?;

        let font_resources = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let content = self.build_content_stream(page, &builder, fonts);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width_mm * PT_PER_MM,
                page.height_mm * PT_PER_MM,
                content_obj_id,
                font_resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        // Write Catalog (object 1)
        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        // Write Pages tree (object 2)
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        // Info dictionary
        let info_obj_id = builder.objects.len();
        builder.objects.push(PdfObject {
            data: b"<< /Title (Flashcards) /Producer (recto 0.1) /Creator (recto) >>".to_vec(),
        });

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &DrawPage,
        builder: &PdfBuilder,
        fonts: &FontLibrary,
    ) -> String {
        let mut stream = String::new();
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    text,
                    x_mm,
                    y_mm,
                    size_pt,
                    font,
                    color,
                    align,
                    baseline,
                } => {
                    // Resolve the anchor against the measured width.
                    let width_mm = fonts.measure_mm(text, *font, *size_pt);
                    let left_mm = match align {
                        Align::Center => x_mm - width_mm / 2.0,
                        Align::Right => x_mm - width_mm,
                    };
                    // A middle baseline anchors the glyph centre at y; the
                    // baseline itself sits half the ascender + descender
                    // span below that centre.
                    let vm = fonts.v_metrics(*font);
                    let baseline_mm = match baseline {
                        Baseline::Middle => {
                            let centre = (vm.ascender + vm.descender) as f64
                                / 2.0
                                / vm.units_per_em as f64;
                            y_mm + centre * size_pt / PT_PER_MM
                        }
                        Baseline::Alphabetic => *y_mm,
                    };

                    // Flip to the PDF bottom-left origin and convert to points.
                    let x_pt = left_mm * PT_PER_MM;
                    let y_pt = (page.height_mm - baseline_mm) * PT_PER_MM;

                    let _ = write!(
                        stream,
                        "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
                        color.r,
                        color.g,
                        color.b,
                        builder.font_index(*font),
                        size_pt,
                        x_pt,
                        y_pt
                    );
                    match font {
                        FontChoice::Face(kind) => {
                            let gids = builder.embedded_gids.get(kind);
                            let mut hex = String::new();
                            for ch in text.chars() {
                                let gid =
                                    gids.and_then(|map| map.get(&ch).copied()).unwrap_or(0);
                                let _ = write!(hex, "{:04X}", gid);
                            }
                            let _ = writeln!(stream, "<{}> Tj", hex);
                        }
                        FontChoice::Builtin(_) => {
                            let _ = writeln!(stream, "({}) Tj", winansi_text(text));
                        }
                    }
                    let _ = writeln!(stream, "ET");
                }

                DrawOp::Rule { from, to, width_mm } => {
                    let _ = write!(
                        stream,
                        "q\n0 0 0 RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        width_mm * PT_PER_MM,
                        from.0 * PT_PER_MM,
                        (page.height_mm - from.1) * PT_PER_MM,
                        to.0 * PT_PER_MM,
                        (page.height_mm - to.1) * PT_PER_MM,
                    );
                }
            }
        }
        stream
    }

    /// Register the fonts actually used across all pages, in a fixed
    /// deterministic order so resource names stay stable across runs.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[DrawPage],
        fonts: &FontLibrary,
    ) -> Result<(), RectoError> {
        let mut used: HashSet<FontChoice> = HashSet::new();
        let mut face_chars: HashMap<FontKind, HashSet<char>> = HashMap::new();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { text, font, .. } = op {
                    used.insert(*font);
                    if let FontChoice::Face(kind) = font {
                        face_chars.entry(*kind).or_default().extend(text.chars());
                    }
                }
            }
        }

        let candidates = [
            FontChoice::Builtin(Weight::Normal),
            FontChoice::Builtin(Weight::Bold),
            FontChoice::Face(FontKind::Cjk),
            FontChoice::Face(FontKind::LatinExt),
        ];
        for choice in candidates {
            if !used.contains(&choice) {
                continue;
            }
            match choice {
                FontChoice::Builtin(weight) => {
                    let base = match weight {
                        Weight::Normal => "Helvetica",
                        Weight::Bold => "Helvetica-Bold",
                    };
                    let obj_id = builder.objects.len();
                    let dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        base
                    );
                    builder.objects.push(PdfObject {
                        data: dict.into_bytes(),
                    });
                    builder.font_objects.push((choice, obj_id));
                }
                FontChoice::Face(kind) => {
                    let used_chars = face_chars.remove(&kind).unwrap_or_default();
                    let type0_id = self.embed_face(builder, kind, &used_chars, fonts)?;
                    builder.font_objects.push((choice, type0_id));
                }
            }
        }

        // A document with no text still needs a font resource.
        if builder.font_objects.is_empty() {
            let obj_id = builder.objects.len();
            builder.objects.push(PdfObject {
                data: b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
                        /Encoding /WinAnsiEncoding >>"
                    .to_vec(),
            });
            builder
                .font_objects
                .push((FontChoice::Builtin(Weight::Normal), obj_id));
        }

        Ok(())
    }

    /// Write the 5 PDF objects for a loaded face. The full font program is
    /// embedded, no subsetting. Returns the object ID of the Type0 root.
    fn embed_face(
        &self,
        builder: &mut PdfBuilder,
        kind: FontKind,
        used_chars: &HashSet<char>,
        fonts: &FontLibrary,
    ) -> Result<usize, RectoError> {
        let loaded = fonts
            .face(kind)
            .ok_or_else(|| RectoError::Font(format!("{kind} face selected but not loaded")))?;
        let face = ttf_parser::Face::parse(&loaded.data, 0)
            .map_err(|e| RectoError::Font(format!("failed to re-parse {kind} face: {e}")))?;

        let metrics = &loaded.metrics;
        let scale = 1000.0 / metrics.units_per_em as f64;
        let pdf_font_name = sanitize_font_name(&loaded.postscript_name);

        let char_to_gid: HashMap<char, u16> = used_chars
            .iter()
            .map(|&ch| (ch, metrics.glyph_id(ch)))
            .collect();

        // 1. FontFile2 stream: the compressed font program.
        let compressed = compress_to_vec_zlib(&loaded.data, 6);
        let fontfile2_id = builder.objects.len();
        let mut fontfile2_data: Vec<u8> = Vec::new();
        let _ = write!(
            fontfile2_data,
            "<< /Length {} /Length1 {} /Filter /FlateDecode >>\nstream\n",
            compressed.len(),
            loaded.data.len()
        );
        fontfile2_data.extend_from_slice(&compressed);
        fontfile2_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject {
            data: fontfile2_data,
        });

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let cap_height = face.capital_height().unwrap_or(metrics.ascender) as f64 * scale;
        let descriptor_id = builder.objects.len();
        let descriptor = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV 80 \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
            (metrics.ascender as f64 * scale) as i32,
            (metrics.descender as f64 * scale) as i32,
            cap_height as i32,
            fontfile2_id,
        );
        builder.objects.push(PdfObject {
            data: descriptor.into_bytes(),
        });

        // 3. CIDFont dictionary (DescendantFont)
        let cidfont_id = builder.objects.len();
        let w_array = build_w_array(&char_to_gid, metrics);
        let cidfont = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW 1000 /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, descriptor_id, w_array,
        );
        builder.objects.push(PdfObject {
            data: cidfont.into_bytes(),
        });

        // 4. ToUnicode CMap, for text extraction and copy-paste.
        let tounicode_id = builder.objects.len();
        let cmap = build_tounicode_cmap(&char_to_gid, &pdf_font_name);
        let compressed_cmap = compress_to_vec_zlib(cmap.as_bytes(), 6);
        let mut tounicode_data: Vec<u8> = Vec::new();
        let _ = write!(
            tounicode_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed_cmap.len()
        );
        tounicode_data.extend_from_slice(&compressed_cmap);
        tounicode_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject {
            data: tounicode_data,
        });

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_id = builder.objects.len();
        let type0 = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        builder.objects.push(PdfObject {
            data: type0.into_bytes(),
        });

        builder.embedded_gids.insert(kind, char_to_gid);
        Ok(type0_id)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        // Binary marker comment so transfer tools treat the file as binary.
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

/// Build the /W per-glyph width array for a CIDFont: `[gid [width] ...]`.
fn build_w_array(char_to_gid: &HashMap<char, u16>, metrics: &FaceMetrics) -> String {
    let scale = 1000.0 / metrics.units_per_em as f64;

    let mut entries: Vec<(u16, u32)> = Vec::new();
    let mut seen: HashSet<u16> = HashSet::new();
    for (&ch, &gid) in char_to_gid {
        if !seen.insert(gid) {
            continue;
        }
        let width = (metrics.advance(ch) as f64 * scale) as u32;
        entries.push((gid, width));
    }
    entries.sort_by_key(|(gid, _)| *gid);

    let mut result = String::from("[");
    for (gid, width) in &entries {
        let _ = write!(result, " {} [{}]", gid, width);
    }
    result.push_str(" ]");
    result
}

/// Build a ToUnicode CMap mapping glyph ids back to code points.
fn build_tounicode_cmap(char_to_gid: &HashMap<char, u16>, font_name: &str) -> String {
    let mut gid_to_unicode: Vec<(u16, u32)> = char_to_gid
        .iter()
        .map(|(&ch, &gid)| (gid, ch as u32))
        .collect();
    gid_to_unicode.sort_by_key(|(gid, _)| *gid);

    let mut cmap = String::new();
    let _ = writeln!(cmap, "/CIDInit /ProcSet findresource begin");
    let _ = writeln!(cmap, "12 dict begin");
    let _ = writeln!(cmap, "begincmap");
    let _ = writeln!(cmap, "/CIDSystemInfo");
    let _ = writeln!(cmap, "<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def");
    let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
    let _ = writeln!(cmap, "/CMapType 2 def");
    let _ = writeln!(cmap, "1 begincodespacerange");
    let _ = writeln!(cmap, "<0000> <FFFF>");
    let _ = writeln!(cmap, "endcodespacerange");

    // bfchar blocks are capped at 100 entries each.
    for chunk in gid_to_unicode.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for &(gid, unicode) in chunk {
            let _ = writeln!(cmap, "<{:04X}> <{:04X}>", gid, unicode);
        }
        let _ = writeln!(cmap, "endbfchar");
    }

    let _ = writeln!(cmap, "endcmap");
    let _ = writeln!(cmap, "CMapName currentdict /CMap defineresource pop");
    let _ = writeln!(cmap, "end");
    let _ = writeln!(cmap, "end");

    cmap
}

/// Sanitize a PostScript name for use as a PDF name object.
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFace".to_string()
    } else {
        cleaned
    }
}

/// Encode text for a WinAnsi-encoded Type1 font, escaping PDF string
/// delimiters and writing non-ASCII bytes as octal escapes.
fn winansi_text(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a code point to its WinAnsiEncoding byte. ASCII and Latin-1 map
/// straight through; the 0x80..0x9F window holds the typographic characters
/// the back side can emit (em dash, smart quotes, ellipsis).
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x2013 => Some(0x96), // en dash
        0x2014 => Some(0x97), // em dash
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2026 => Some(0x85), // ellipsis
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Color;

    fn text_op(text: &str, weight: Weight) -> DrawOp {
        DrawOp::Text {
            text: text.to_string(),
            x_mm: 148.5,
            y_mm: 52.5,
            size_pt: 100.0,
            font: FontChoice::Builtin(weight),
            color: Color::RED,
            align: Align::Center,
            baseline: Baseline::Middle,
        }
    }

    fn page(ops: Vec<DrawOp>) -> DrawPage {
        DrawPage {
            width_mm: 297.0,
            height_mm: 210.0,
            ops,
        }
    }

    #[test]
    fn empty_document_is_structurally_valid() {
        let fonts = FontLibrary::new();
        let bytes = PdfWriter::new().write(&[page(vec![])], &fonts).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn media_box_is_a4_landscape_points() {
        let fonts = FontLibrary::new();
        let bytes = PdfWriter::new().write(&[page(vec![])], &fonts).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox [0 0 841.89 595.28]"));
    }

    #[test]
    fn each_used_builtin_weight_gets_its_own_font_object() {
        let fonts = FontLibrary::new();
        let p = page(vec![
            text_op("cat", Weight::Bold),
            text_op("dog", Weight::Normal),
        ]);
        let bytes = PdfWriter::new().write(&[p], &fonts).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn builtin_only_document_embeds_no_cid_fonts() {
        let fonts = FontLibrary::new();
        let bytes = PdfWriter::new()
            .write(&[page(vec![text_op("cat", Weight::Bold)])], &fonts)
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Type1"));
        assert!(text.contains("/WinAnsiEncoding"));
        assert!(!text.contains("CIDFontType2"));
    }

    #[test]
    fn page_count_matches_input() {
        let fonts = FontLibrary::new();
        let pages: Vec<DrawPage> = (0..4)
            .map(|_| page(vec![text_op("cat", Weight::Bold)]))
            .collect();
        let bytes = PdfWriter::new().write(&pages, &fonts).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 4"));
    }

    #[test]
    fn winansi_escapes_delimiters_and_maps_the_em_dash() {
        assert_eq!(winansi_text("a(b)c"), "a\\(b\\)c");
        assert_eq!(winansi_text("back\\slash"), "back\\\\slash");
        assert_eq!(winansi_text("\u{2014}"), "\\227");
        // Unmapped code points degrade to '?'.
        assert_eq!(winansi_text("狗"), "?");
    }

    #[test]
    fn tounicode_cmap_maps_gids_to_code_points() {
        let mut char_to_gid = HashMap::new();
        char_to_gid.insert('A', 36u16);
        char_to_gid.insert('B', 37u16);
        let cmap = build_tounicode_cmap(&char_to_gid, "TestFace");
        assert!(cmap.contains("begincmap"));
        assert!(cmap.contains("endcmap"));
        assert!(cmap.contains("<0024> <0041>"));
        assert!(cmap.contains("<0025> <0042>"));
        assert!(cmap.contains("<0000> <FFFF>"));
    }

    #[test]
    fn sanitize_font_name_strips_specials() {
        assert_eq!(
            sanitize_font_name("NotoSansSC-Regular"),
            "NotoSansSC-Regular"
        );
        assert_eq!(sanitize_font_name("Noto Sans (SC)"), "NotoSansSC");
        assert_eq!(sanitize_font_name(""), "EmbeddedFace");
    }
}
