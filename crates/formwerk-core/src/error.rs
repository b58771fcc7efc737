// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Formwerk.

use thiserror::Error;

/// Top-level error type for all Formwerk operations.
#[derive(Debug, Error)]
pub enum FormwerkError {
    // -- Generation errors --
    #[error("source document unusable: {0}")]
    SourceDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("font embedding failed: {0}")]
    FontEmbed(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("rasterisation failed: {0}")]
    Raster(String),

    #[error("external tool `{tool}` failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    // -- Template errors --
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("form validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    // -- Storage / lookup --
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FormwerkError>;
