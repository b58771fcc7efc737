// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generation context — everything one generation call owns: the output
// document, its page table, and the font and image caches.

use std::collections::HashMap;
use std::sync::Arc;

use formwerk_core::error::{FormwerkError, Result};
use formwerk_core::{Diagnostic, FontRegistry};
use lopdf::Document;
use tracing::debug;

use crate::font::FontResolver;
use crate::pdf::{EmbeddedImage, PageTable};

/// Per-call state. Never shared between calls.
pub struct GenerationContext {
    pub document: Document,
    pub pages: PageTable,
    pub fonts: FontResolver,
    /// Image rasters keyed by field key, blurred or not.
    pub images: HashMap<String, EmbeddedImage>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationContext {
    pub fn new(
        document: Document,
        appended_size: (f32, f32),
        registry: Arc<dyn FontRegistry>,
        default_font: &str,
    ) -> Result<Self> {
        let pages = PageTable::new(&document, appended_size)?;
        Ok(Self {
            document,
            pages,
            fonts: FontResolver::new(registry, default_font),
            images: HashMap::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Finalise fonts and serialise the document.
    pub fn serialize(mut self, compress: bool) -> Result<(Vec<u8>, Vec<Diagnostic>)> {
        self.fonts.finalize(&mut self.document)?;
        if compress {
            self.document.compress();
        }

        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|err| FormwerkError::PdfError(format!("failed to serialise document: {err}")))?;
        debug!(bytes = bytes.len(), fonts = self.fonts.len(), "Document serialised");
        Ok((bytes, self.diagnostics))
    }
}
