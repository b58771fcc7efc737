// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TrueType/OpenType embedding into a lopdf document.
//
// Two strategies are available. `Composite` embeds the whole font program as
// a Type0/Identity-H font addressed by glyph id; its width table and
// ToUnicode map only cover the glyphs actually drawn and are written by
// `finalize` just before the document is serialised. `Simple` embeds it as a
// single-byte TrueType font with WinAnsi encoding and a fixed 32..=255 width
// table.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use formwerk_core::error::{FormwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use ttf_parser::Face;
use ttf_parser::name::name_id;

use super::standard::{win_ansi_byte, win_ansi_char};

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

/// How a custom font program is written into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    Simple,
    Composite,
}

/// Descriptor-level metrics, in 1/1000 em.
#[derive(Debug, Clone)]
struct ProgramMetrics {
    postscript_name: String,
    units_per_em: u16,
    ascent: i64,
    descent: i64,
    cap_height: i64,
    bbox: [i64; 4],
    italic_angle: i64,
    fixed_pitch: bool,
    italic: bool,
    cff: bool,
}

impl ProgramMetrics {
    fn from_face(face: &Face<'_>) -> Self {
        let units_per_em = face.units_per_em().max(1);
        let scale = |value: i16| (value as i64 * 1000) / units_per_em as i64;
        let bbox = face.global_bounding_box();
        let ascent = scale(face.ascender());

        Self {
            postscript_name: postscript_name(face),
            units_per_em,
            ascent,
            descent: scale(face.descender()),
            cap_height: face.capital_height().map(scale).unwrap_or(ascent),
            bbox: [
                scale(bbox.x_min),
                scale(bbox.y_min),
                scale(bbox.x_max),
                scale(bbox.y_max),
            ],
            italic_angle: face.italic_angle().map(|a| a.round() as i64).unwrap_or(0),
            fixed_pitch: face.is_monospaced(),
            italic: face.is_italic(),
            cff: face.tables().cff.is_some(),
        }
    }

    fn to_thousandths(&self, advance: u16) -> u16 {
        ((advance as u32 * 1000) / self.units_per_em as u32) as u16
    }

    fn descriptor(&self, symbolic: bool, file_key: &str, file_id: ObjectId) -> Dictionary {
        let mut flags = if symbolic { 4 } else { 32 };
        if self.fixed_pitch {
            flags |= 1;
        }
        if self.italic {
            flags |= 64;
        }

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        dict.set(
            "FontName",
            Object::Name(self.postscript_name.as_bytes().to_vec()),
        );
        dict.set("Flags", Object::Integer(flags));
        dict.set(
            "FontBBox",
            Object::Array(self.bbox.iter().map(|v| Object::Integer(*v)).collect()),
        );
        dict.set("ItalicAngle", Object::Integer(self.italic_angle));
        dict.set("Ascent", Object::Integer(self.ascent));
        dict.set("Descent", Object::Integer(self.descent));
        dict.set("CapHeight", Object::Integer(self.cap_height));
        dict.set("StemV", Object::Integer(80));
        dict.set(file_key, Object::Reference(file_id));
        dict
    }
}

/// PostScript name from the `name` table, sanitised for use as a PDF name.
fn postscript_name(face: &Face<'_>) -> String {
    let name = face
        .names()
        .into_iter()
        .filter(|entry| entry.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|entry| entry.to_string())
        .unwrap_or_else(|| "EmbeddedFont".to_string());
    let clean: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if clean.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        clean
    }
}

fn parse(bytes: &[u8]) -> Result<Face<'_>> {
    Face::parse(bytes, 0)
        .map_err(|err| FormwerkError::FontEmbed(format!("cannot parse font program: {err}")))
}

/// Write the font program stream and return its id with the descriptor key.
fn add_font_file(doc: &mut Document, bytes: &[u8], metrics: &ProgramMetrics) -> (ObjectId, &'static str) {
    let mut dict = Dictionary::new();
    let key = if metrics.cff {
        dict.set("Subtype", Object::Name(b"OpenType".to_vec()));
        "FontFile3"
    } else {
        dict.set("Length1", Object::Integer(bytes.len() as i64));
        "FontFile2"
    };
    let id = doc.add_object(Object::Stream(Stream::new(dict, bytes.to_vec())));
    (id, key)
}

/// A font embedded with the `Simple` strategy.
#[derive(Debug, Clone)]
pub struct SimpleFont {
    /// Advance per WinAnsi code 32..=255, 1/1000 em; `None` when the font
    /// has no glyph for the code.
    widths: Vec<Option<u16>>,
    missing_width: u16,
}

impl SimpleFont {
    /// Embed `bytes` and return the font dictionary id.
    pub fn embed(doc: &mut Document, bytes: &[u8]) -> Result<(ObjectId, Self)> {
        let face = parse(bytes)?;
        if face.tables().glyf.is_none() {
            return Err(FormwerkError::FontEmbed(
                "font has no TrueType outlines".to_string(),
            ));
        }
        if face.glyph_index('A').is_none() {
            return Err(FormwerkError::FontEmbed(
                "font has no Unicode mapping for Latin text".to_string(),
            ));
        }

        let metrics = ProgramMetrics::from_face(&face);
        let widths: Vec<Option<u16>> = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                let ch = win_ansi_char(code)?;
                let glyph = face.glyph_index(ch)?;
                face.glyph_hor_advance(glyph)
                    .map(|advance| metrics.to_thousandths(advance))
            })
            .collect();
        let missing_width = widths[0].unwrap_or(500);

        let (file_id, file_key) = add_font_file(doc, bytes, &metrics);
        let descriptor_id =
            doc.add_object(Object::Dictionary(metrics.descriptor(false, file_key, file_id)));

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"TrueType".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(metrics.postscript_name.as_bytes().to_vec()),
        );
        dict.set("FirstChar", Object::Integer(FIRST_CHAR as i64));
        dict.set("LastChar", Object::Integer(LAST_CHAR as i64));
        dict.set(
            "Widths",
            Object::Array(
                widths
                    .iter()
                    .map(|w| Object::Integer(w.unwrap_or(missing_width) as i64))
                    .collect(),
            ),
        );
        dict.set("FontDescriptor", Object::Reference(descriptor_id));
        dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = doc.add_object(Object::Dictionary(dict));

        Ok((
            font_id,
            Self {
                widths,
                missing_width,
            },
        ))
    }

    fn slot(&self, ch: char) -> Option<u16> {
        let byte = win_ansi_byte(ch)?;
        self.widths
            .get(byte.checked_sub(FIRST_CHAR)? as usize)
            .copied()
            .flatten()
    }

    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| self.slot(ch).unwrap_or(self.missing_width) as u32)
            .sum();
        units as f32 * font_size / 1000.0
    }

    pub fn encode(&self, text: &str, strict: bool) -> std::result::Result<(Vec<u8>, bool), char> {
        let mut bytes = Vec::with_capacity(text.len());
        let mut substituted = false;
        for ch in text.chars() {
            match (win_ansi_byte(ch), self.slot(ch)) {
                (Some(byte), Some(_)) => bytes.push(byte),
                _ if strict => return Err(ch),
                _ => {
                    bytes.push(b'?');
                    substituted = true;
                }
            }
        }
        Ok((bytes, substituted))
    }
}

/// A font embedded with the `Composite` strategy.
#[derive(Debug, Clone)]
pub struct CompositeFont {
    program: Arc<Vec<u8>>,
    units_per_em: u16,
    descendant_id: ObjectId,
    to_unicode_id: ObjectId,
    /// Glyphs drawn so far: gid → (character, advance in 1/1000 em).
    used: BTreeMap<u16, (char, u16)>,
}

impl CompositeFont {
    pub fn embed(doc: &mut Document, program: Arc<Vec<u8>>) -> Result<(ObjectId, Self)> {
        let face = parse(&program)?;
        if face.tables().cmap.is_none() {
            return Err(FormwerkError::FontEmbed(
                "font has no character map".to_string(),
            ));
        }
        let metrics = ProgramMetrics::from_face(&face);

        let (file_id, file_key) = add_font_file(doc, &program, &metrics);
        let descriptor_id =
            doc.add_object(Object::Dictionary(metrics.descriptor(true, file_key, file_id)));

        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::string_literal("Adobe"));
        system_info.set("Ordering", Object::string_literal("Identity"));
        system_info.set("Supplement", Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        let subtype: &[u8] = if metrics.cff {
            b"CIDFontType0"
        } else {
            b"CIDFontType2"
        };
        cid_font.set("Subtype", Object::Name(subtype.to_vec()));
        cid_font.set(
            "BaseFont",
            Object::Name(metrics.postscript_name.as_bytes().to_vec()),
        );
        cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        cid_font.set("DW", Object::Integer(1000));
        if !metrics.cff {
            cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        }
        let descendant_id = doc.add_object(Object::Dictionary(cid_font));

        let to_unicode_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            to_unicode_cmap(&BTreeMap::new()).into_bytes(),
        )));

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type0".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(metrics.postscript_name.as_bytes().to_vec()),
        );
        dict.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        dict.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(descendant_id)]),
        );
        dict.set("ToUnicode", Object::Reference(to_unicode_id));
        let font_id = doc.add_object(Object::Dictionary(dict));

        Ok((
            font_id,
            Self {
                program,
                units_per_em: metrics.units_per_em,
                descendant_id,
                to_unicode_id,
                used: BTreeMap::new(),
            },
        ))
    }

    fn advance(&self, face: &Face<'_>, glyph: ttf_parser::GlyphId) -> u16 {
        face.glyph_hor_advance(glyph)
            .map(|advance| ((advance as u32 * 1000) / self.units_per_em.max(1) as u32) as u16)
            .unwrap_or(0)
    }

    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let Ok(face) = parse(&self.program) else {
            return 0.0;
        };
        let units: u32 = text
            .chars()
            .map(|ch| {
                let glyph = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
                self.advance(&face, glyph) as u32
            })
            .sum();
        units as f32 * font_size / 1000.0
    }

    /// Two-byte glyph ids for `text`; records every glyph as used.
    pub fn encode(
        &mut self,
        text: &str,
        strict: bool,
    ) -> std::result::Result<(Vec<u8>, bool), char> {
        let program = Arc::clone(&self.program);
        let Ok(face) = parse(&program) else {
            return Err(text.chars().next().unwrap_or('\u{FFFD}'));
        };

        let mut glyphs = Vec::with_capacity(text.len());
        let mut substituted = false;
        for ch in text.chars() {
            match face.glyph_index(ch) {
                Some(glyph) => glyphs.push((ch, glyph)),
                None if strict => return Err(ch),
                None => {
                    glyphs.push((ch, ttf_parser::GlyphId(0)));
                    substituted = true;
                }
            }
        }

        let mut bytes = Vec::with_capacity(glyphs.len() * 2);
        for (ch, glyph) in glyphs {
            let advance = self.advance(&face, glyph);
            if glyph.0 != 0 {
                self.used.entry(glyph.0).or_insert((ch, advance));
            }
            bytes.extend_from_slice(&glyph.0.to_be_bytes());
        }
        Ok((bytes, substituted))
    }

    /// Write the width table and ToUnicode map for the glyphs drawn.
    pub fn finalize(&self, doc: &mut Document) -> Result<()> {
        let widths: Vec<Object> = self
            .used
            .iter()
            .flat_map(|(gid, (_, advance))| {
                [
                    Object::Integer(*gid as i64),
                    Object::Array(vec![Object::Integer(*advance as i64)]),
                ]
            })
            .collect();

        match doc.get_object_mut(self.descendant_id) {
            Ok(Object::Dictionary(dict)) => dict.set("W", Object::Array(widths)),
            _ => {
                return Err(FormwerkError::PdfError(
                    "descendant font object missing".to_string(),
                ));
            }
        }

        doc.objects.insert(
            self.to_unicode_id,
            Object::Stream(Stream::new(
                Dictionary::new(),
                to_unicode_cmap(&self.used).into_bytes(),
            )),
        );
        Ok(())
    }
}

fn to_unicode_cmap(used: &BTreeMap<u16, (char, u16)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );

    let entries: Vec<(&u16, &(char, u16))> = used.iter().collect();
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, (ch, _)) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            let _ = writeln!(cmap, "<{gid:04X}> <{hex}>");
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
