// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transient text surface — a single-page PDF holding one string, built with
// `printpdf` and handed to the rasteriser.

use formwerk_core::FontRegistry;
use formwerk_core::error::{FormwerkError, Result};
use printpdf::{
    BuiltinFont, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    TextItem,
};
use tracing::{debug, instrument, warn};

use crate::font::{FontFace, ResolvedFont, StandardFont};

/// Font used on a transient surface.
pub enum SurfaceFont {
    Builtin(BuiltinFont),
    Parsed(Box<ParsedFont>),
}

impl SurfaceFont {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }
}

/// Re-embed a resolved font for a transient surface.
///
/// Custom programs are parsed from the cached bytes first, then re-read from
/// the registry by identifier. If neither parses, `default` is used.
pub fn surface_font(
    resolved: &ResolvedFont,
    registry: &dyn FontRegistry,
    default: StandardFont,
) -> SurfaceFont {
    if let FontFace::Standard(font) = resolved.face() {
        return SurfaceFont::Builtin(font.builtin());
    }

    if let Some(font) = resolved.program().and_then(|bytes| parse(bytes)) {
        return SurfaceFont::Parsed(Box::new(font));
    }
    debug!(font = resolved.identifier(), "Cached program unusable, re-reading registry");

    match registry.load(resolved.identifier()) {
        Ok(Some(bytes)) => {
            if let Some(font) = parse(&bytes) {
                return SurfaceFont::Parsed(Box::new(font));
            }
        }
        Ok(None) => {}
        Err(err) => debug!(font = resolved.identifier(), error = %err, "Registry read failed"),
    }

    warn!(
        font = resolved.identifier(),
        fallback = default.base_font(),
        "Surface uses default font"
    );
    SurfaceFont::Builtin(default.builtin())
}

fn parse(bytes: &[u8]) -> Option<ParsedFont> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    ParsedFont::from_bytes(bytes, 0, &mut warnings)
}

/// Render `text` black on a page of `width` x `height` points, with the
/// baseline origin at `(padding, padding)`. Returns the serialised PDF.
#[instrument(skip(text, font), fields(text_len = text.len()))]
pub fn render_text_surface(
    text: &str,
    font: &SurfaceFont,
    font_size: f32,
    width: f32,
    height: f32,
    padding: f32,
) -> Result<Vec<u8>> {
    if !(width > 0.0 && height > 0.0) {
        return Err(FormwerkError::Raster(format!(
            "surface has no area ({width} x {height} pt)"
        )));
    }

    let mut doc = PdfDocument::new("formwerk surface");

    let mut ops: Vec<Op> = vec![
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point {
                x: Pt(padding),
                y: Pt(padding),
            },
        },
    ];
    match font {
        SurfaceFont::Builtin(builtin) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(font_size),
                font: *builtin,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font: *builtin,
            });
        }
        SurfaceFont::Parsed(parsed) => {
            let font_id = doc.add_font(parsed);
            ops.push(Op::SetFontSize {
                size: Pt(font_size),
                font: font_id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: font_id,
            });
        }
    }
    ops.push(Op::EndTextSection);

    doc.with_pages(vec![PdfPage::new(pt_to_mm(width), pt_to_mm(height), ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    debug!(bytes = output.len(), warnings = warnings.len(), "Surface rendered");
    Ok(output)
}

fn pt_to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}
