// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The 14 standard PDF fonts: identifier mapping, WinAnsi encoding, and AFM
// advance widths for measuring text without a font program.

use lopdf::{Dictionary, Object};

/// One of the standard fonts every PDF reader provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    /// Map a template font identifier to a standard font.
    ///
    /// `Times-Roman` is accepted as a legacy alias of `TimesRoman`.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let font = match identifier {
            "Courier" => Self::Courier,
            "CourierBold" => Self::CourierBold,
            "CourierOblique" => Self::CourierOblique,
            "CourierBoldOblique" => Self::CourierBoldOblique,
            "Helvetica" => Self::Helvetica,
            "HelveticaBold" => Self::HelveticaBold,
            "HelveticaOblique" => Self::HelveticaOblique,
            "HelveticaBoldOblique" => Self::HelveticaBoldOblique,
            "TimesRoman" | "Times-Roman" => Self::TimesRoman,
            "TimesBold" => Self::TimesBold,
            "TimesItalic" => Self::TimesItalic,
            "TimesBoldItalic" => Self::TimesBoldItalic,
            "Symbol" => Self::Symbol,
            "ZapfDingbats" => Self::ZapfDingbats,
            _ => return None,
        };
        Some(font)
    }

    /// PostScript name written as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbol and ZapfDingbats use their built-in encodings.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbol | Self::ZapfDingbats)
    }

    /// The equivalent printpdf builtin, used on transient surfaces.
    pub fn builtin(&self) -> printpdf::BuiltinFont {
        use printpdf::BuiltinFont as B;
        match self {
            Self::Courier => B::Courier,
            Self::CourierBold => B::CourierBold,
            Self::CourierOblique => B::CourierOblique,
            Self::CourierBoldOblique => B::CourierBoldOblique,
            Self::Helvetica => B::Helvetica,
            Self::HelveticaBold => B::HelveticaBold,
            Self::HelveticaOblique => B::HelveticaOblique,
            Self::HelveticaBoldOblique => B::HelveticaBoldOblique,
            Self::TimesRoman => B::TimesRoman,
            Self::TimesBold => B::TimesBold,
            Self::TimesItalic => B::TimesItalic,
            Self::TimesBoldItalic => B::TimesBoldItalic,
            Self::Symbol => B::Symbol,
            Self::ZapfDingbats => B::ZapfDingbats,
        }
    }

    /// Font dictionary referencing this font by name.
    pub fn dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set("BaseFont", Object::Name(self.base_font().as_bytes().to_vec()));
        if !self.is_symbolic() {
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        }
        dict
    }

    /// Advance width of `ch` in 1/1000 em.
    ///
    /// Italic and oblique variants share their upright widths; characters
    /// outside printable ASCII use a per-family average.
    pub fn advance(&self, ch: char) -> u16 {
        let table = match self {
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => return 600,
            Self::Symbol | Self::ZapfDingbats => return 600,
            Self::Helvetica | Self::HelveticaOblique => &HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &HELVETICA_BOLD,
            Self::TimesRoman | Self::TimesItalic => &TIMES_ROMAN,
            Self::TimesBold | Self::TimesBoldItalic => &TIMES_BOLD,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            match self {
                Self::TimesRoman | Self::TimesItalic | Self::TimesBold | Self::TimesBoldItalic => {
                    500
                }
                _ => 556,
            }
        }
    }

    /// Width of `text` at `font_size` points.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| self.advance(ch) as u32).sum();
        units as f32 * font_size / 1000.0
    }

    /// Encode `text` for a string operand of this font.
    ///
    /// Returns the bytes and whether any character had to be replaced by `?`.
    /// With `strict` set, an unencodable character is an error instead.
    pub fn encode(&self, text: &str, strict: bool) -> Result<(Vec<u8>, bool), char> {
        if self.is_symbolic() {
            return encode_with(text, strict, |ch| u8::try_from(ch as u32).ok());
        }
        encode_with(text, strict, win_ansi_byte)
    }
}

fn encode_with(
    text: &str,
    strict: bool,
    map: impl Fn(char) -> Option<u8>,
) -> Result<(Vec<u8>, bool), char> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut substituted = false;
    for ch in text.chars() {
        match map(ch) {
            Some(byte) => bytes.push(byte),
            None if strict => return Err(ch),
            None => {
                bytes.push(b'?');
                substituted = true;
            }
        }
    }
    Ok((bytes, substituted))
}

/// Characters of WinAnsiEncoding codes 0x80..=0x9F.
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// WinAnsiEncoding code for `ch`, if it has one.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(_, mapped)| *mapped == ch)
            .map(|(byte, _)| *byte),
    }
}

/// Character for a WinAnsiEncoding code, if the code is assigned.
pub fn win_ansi_char(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(code, _)| *code == byte)
            .map(|(_, ch)| *ch),
    }
}

// AFM advance widths for codes 32..=126.

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];
