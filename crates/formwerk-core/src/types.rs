// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request-scoped domain types for the Formwerk generator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Points per millimetre (1in = 72pt = 25.4mm).
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (w as f32 * PT_PER_MM, h as f32 * PT_PER_MM)
    }
}

/// Blur strengths applied to blurred fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurOptions {
    /// Text blur strength; the filter radius is `text_blur / 4`.
    pub text_blur: f32,
    /// Blur radius for image fields.
    pub image_blur: f32,
}

impl Default for BlurOptions {
    fn default() -> Self {
        Self {
            text_blur: 40.0,
            image_blur: 50.0,
        }
    }
}

/// One generation request: submitted values plus per-field flags.
///
/// Missing visibility entries mean "visible"; missing blur entries mean
/// "not blurred".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub form_data: HashMap<String, String>,
    pub field_visibility: HashMap<String, bool>,
    pub field_blur: HashMap<String, bool>,
    /// Per-request override of the configured blur strengths.
    pub blur_options: Option<BlurOptions>,
}

impl GenerationRequest {
    pub fn new(form_data: HashMap<String, String>) -> Self {
        Self {
            form_data,
            ..Self::default()
        }
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.field_visibility.get(key).copied().unwrap_or(true)
    }

    pub fn is_blurred(&self, key: &str) -> bool {
        self.field_blur.get(key).copied().unwrap_or(false)
    }

    /// Submitted value if present and non-empty after trimming.
    pub fn submitted(&self, key: &str) -> Option<&str> {
        self.form_data
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// A degraded operation absorbed during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A font identifier could not be resolved; the default font was used.
    FontFallback { font: String, reason: String },
    /// An image field was omitted from the output.
    ImageSkipped { field: String, reason: String },
    /// Text blur failed; the text was placed unblurred.
    BlurFallback {
        field: String,
        page: u32,
        reason: String,
    },
    /// Characters the font cannot encode were substituted.
    TextSubstituted { field: String, font: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FontFallback { font, reason } => {
                write!(f, "font '{font}' unavailable, using default ({reason})")
            }
            Self::ImageSkipped { field, reason } => {
                write!(f, "image for field '{field}' skipped ({reason})")
            }
            Self::BlurFallback {
                field,
                page,
                reason,
            } => write!(
                f,
                "blur failed for field '{field}' on page {page}, drew plain text ({reason})"
            ),
            Self::TextSubstituted { field, font } => {
                write!(f, "field '{field}' has characters '{font}' cannot encode")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_visible_and_unblurred() {
        let request = GenerationRequest::default();
        assert!(request.is_visible("anything"));
        assert!(!request.is_blurred("anything"));
    }

    #[test]
    fn whitespace_submissions_are_ignored() {
        let mut form = HashMap::new();
        form.insert("name".to_string(), "   ".to_string());
        form.insert("city".to_string(), "Oslo".to_string());
        let request = GenerationRequest::new(form);
        assert_eq!(request.submitted("name"), None);
        assert_eq!(request.submitted("city"), Some("Oslo"));
        assert_eq!(request.submitted("missing"), None);
    }

    #[test]
    fn request_deserializes_camel_case() {
        let json = r#"{
            "formData": {"name": "Ada"},
            "fieldVisibility": {"name": true},
            "fieldBlur": {"name": true},
            "blurOptions": {"textBlur": 20, "imageBlur": 5}
        }"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.submitted("name"), Some("Ada"));
        assert!(request.is_blurred("name"));
        assert_eq!(request.blur_options.unwrap().text_blur, 20.0);
    }

    #[test]
    fn a4_in_points() {
        let (w, h) = PaperSize::A4.dimensions_pt();
        assert!((w - 595.28).abs() < 0.1);
        assert!((h - 841.89).abs() < 0.1);
    }
}
