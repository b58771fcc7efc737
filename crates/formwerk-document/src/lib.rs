// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// formwerk-document — Overlay and redaction engine for Formwerk templates.
//
// Loads a template's source PDF, resolves and embeds fonts, places text and
// images at each field position, blurs redacted fields through a raster
// backend, and serialises the result.

pub mod compose;
pub mod context;
pub mod font;
pub mod pdf;
pub mod raster;
pub mod render;

// Re-export the primary structs so callers can use `formwerk_document::DocumentComposer` etc.
pub use compose::{DocumentComposer, GeneratedDocument};
pub use context::GenerationContext;
pub use font::{FontResolver, ResolvedFont, StandardFont};
pub use pdf::PageTable;
pub use raster::{BlurPipeline, MagickRasterBlur, RasterBlur, RasterPatch, StubRasterBlur};
pub use render::FieldRenderer;
