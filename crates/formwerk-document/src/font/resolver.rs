// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font resolver — maps template font identifiers to fonts embedded in the
// output document, with a guaranteed standard-font fallback.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use formwerk_core::error::Result;
use formwerk_core::{Diagnostic, FontRegistry};
use lopdf::{Document, Object, ObjectId, StringFormat};
use tracing::{debug, info, instrument, warn};

use super::embed::{CompositeFont, EmbedMode, SimpleFont};
use super::standard::StandardFont;

/// How a resolved font is realised in the document.
#[derive(Debug, Clone)]
pub enum FontFace {
    Standard(StandardFont),
    Simple(SimpleFont),
    Composite(CompositeFont),
}

/// A font usable for drawing into the output document.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    identifier: String,
    object_id: ObjectId,
    face: FontFace,
    /// Font program bytes for custom fonts.
    program: Option<Arc<Vec<u8>>>,
}

impl ResolvedFont {
    /// Identifier this font was resolved for (not necessarily what it is).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn face(&self) -> &FontFace {
        &self.face
    }

    pub fn program(&self) -> Option<&Arc<Vec<u8>>> {
        self.program.as_ref()
    }

    /// Rendered width of `text` at `font_size`, in points.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        match &self.face {
            FontFace::Standard(font) => font.measure(text, font_size),
            FontFace::Simple(font) => font.measure(text, font_size),
            FontFace::Composite(font) => font.measure(text, font_size),
        }
    }

    /// Encode `text` as a string operand for this font.
    ///
    /// In lossy mode unencodable characters become `?` (or glyph 0) and the
    /// flag in the result is set; in strict mode the first such character is
    /// returned as the error.
    pub fn encode(&mut self, text: &str, strict: bool) -> std::result::Result<(Object, bool), char> {
        match &mut self.face {
            FontFace::Standard(font) => font
                .encode(text, strict)
                .map(|(bytes, lossy)| (Object::String(bytes, StringFormat::Literal), lossy)),
            FontFace::Simple(font) => font
                .encode(text, strict)
                .map(|(bytes, lossy)| (Object::String(bytes, StringFormat::Literal), lossy)),
            FontFace::Composite(font) => font
                .encode(text, strict)
                .map(|(bytes, lossy)| (Object::String(bytes, StringFormat::Hexadecimal), lossy)),
        }
    }

    /// Fail on the first character this font cannot draw, without recording
    /// anything as used.
    pub fn check_encodable(&self, text: &str) -> std::result::Result<(), char> {
        let mut scratch = self.clone();
        scratch.encode(text, true).map(|_| ())
    }
}

/// Resolves and caches fonts for one generation call.
pub struct FontResolver {
    registry: Arc<dyn FontRegistry>,
    default: StandardFont,
    cache: HashMap<String, ResolvedFont>,
    standard_objects: HashMap<StandardFont, ObjectId>,
}

impl FontResolver {
    /// `default_identifier` must name a standard font; anything else falls
    /// back to Helvetica.
    pub fn new(registry: Arc<dyn FontRegistry>, default_identifier: &str) -> Self {
        let default = StandardFont::from_identifier(default_identifier).unwrap_or_else(|| {
            warn!(
                font = default_identifier,
                "Default font is not a standard font, using Helvetica"
            );
            StandardFont::Helvetica
        });
        Self {
            registry,
            default,
            cache: HashMap::new(),
            standard_objects: HashMap::new(),
        }
    }

    pub fn default_font(&self) -> StandardFont {
        self.default
    }

    pub fn registry(&self) -> &dyn FontRegistry {
        self.registry.as_ref()
    }

    /// Number of distinct identifiers resolved so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Resolve `identifier`, embedding it on first use. Never fails: anything
    /// unresolvable becomes the default font and a diagnostic.
    #[instrument(skip(self, doc, diagnostics))]
    pub fn resolve(
        &mut self,
        doc: &mut Document,
        identifier: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> &mut ResolvedFont {
        match self.cache.entry(identifier.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let font = load(
                    self.registry.as_ref(),
                    self.default,
                    &mut self.standard_objects,
                    doc,
                    identifier,
                    diagnostics,
                );
                entry.insert(font)
            }
        }
    }

    /// Write deferred tables of every composite font.
    pub fn finalize(&self, doc: &mut Document) -> Result<()> {
        for font in self.cache.values() {
            if let FontFace::Composite(composite) = &font.face {
                composite.finalize(doc)?;
            }
        }
        Ok(())
    }
}

fn standard(
    objects: &mut HashMap<StandardFont, ObjectId>,
    doc: &mut Document,
    identifier: &str,
    font: StandardFont,
) -> ResolvedFont {
    let object_id = *objects
        .entry(font)
        .or_insert_with(|| doc.add_object(Object::Dictionary(font.dictionary())));
    ResolvedFont {
        identifier: identifier.to_string(),
        object_id,
        face: FontFace::Standard(font),
        program: None,
    }
}

fn load(
    registry: &dyn FontRegistry,
    default: StandardFont,
    objects: &mut HashMap<StandardFont, ObjectId>,
    doc: &mut Document,
    identifier: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> ResolvedFont {
    if identifier.is_empty() {
        debug!("No font named, using default");
        return standard(objects, doc, identifier, default);
    }

    if let Some(font) = StandardFont::from_identifier(identifier) {
        debug!(font = identifier, "Using standard font");
        return standard(objects, doc, identifier, font);
    }

    let reason = match registry.load(identifier) {
        Ok(Some(program)) => match embed_program(doc, Arc::clone(&program)) {
            Ok((object_id, face, mode)) => {
                info!(font = identifier, ?mode, "Embedded custom font");
                return ResolvedFont {
                    identifier: identifier.to_string(),
                    object_id,
                    face,
                    program: Some(program),
                };
            }
            Err(reason) => reason,
        },
        Ok(None) => "not registered".to_string(),
        Err(err) => err.to_string(),
    };

    warn!(font = identifier, %reason, fallback = default.base_font(), "Font fallback");
    diagnostics.push(Diagnostic::FontFallback {
        font: identifier.to_string(),
        reason,
    });
    standard(objects, doc, identifier, default)
}

/// Try the composite strategy, then the simple one.
///
/// Composite fonts address every glyph in the program, so any character the
/// font covers can be drawn. The simple WinAnsi font is the fallback.
fn embed_program(
    doc: &mut Document,
    program: Arc<Vec<u8>>,
) -> std::result::Result<(ObjectId, FontFace, EmbedMode), String> {
    let composite_err = match CompositeFont::embed(doc, Arc::clone(&program)) {
        Ok((id, font)) => return Ok((id, FontFace::Composite(font), EmbedMode::Composite)),
        Err(err) => err,
    };
    debug!(error = %composite_err, "Composite embedding failed, retrying as simple");

    match SimpleFont::embed(doc, &program) {
        Ok((id, font)) => Ok((id, FontFace::Simple(font), EmbedMode::Simple)),
        Err(err) => Err(format!("{composite_err}; {err}")),
    }
}
