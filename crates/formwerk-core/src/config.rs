// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generator configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::BlurOptions;

/// Settings shared by every generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Text blur strength; the blur radius is a quarter of this.
    pub text_blur_strength: f32,
    /// Fixed blur radius applied to image fields.
    pub image_blur_sigma: f32,
    /// Upscale factor applied to images before blurring.
    pub image_upscale: f32,
    /// Density used when rasterising the transient text surface.
    pub raster_dpi: u32,
    /// Font identifier used when a field names none.
    pub default_font: String,
    /// Font size used when a field names none.
    pub default_font_size: f32,
    /// Paper size of pages appended past the end of the source document.
    pub appended_page_size: crate::PaperSize,
    /// ImageMagick executable used for rasterisation.
    pub magick_binary: String,
    /// Parent directory for file-based transient artifacts (system temp if unset).
    pub temp_dir: Option<PathBuf>,
    /// Flate-compress streams when serialising the output document.
    pub compress_output: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            text_blur_strength: 40.0,
            image_blur_sigma: 50.0,
            image_upscale: 1.3,
            raster_dpi: 300,
            default_font: crate::template::DEFAULT_FONT.to_string(),
            default_font_size: crate::template::DEFAULT_FONT_SIZE,
            appended_page_size: crate::PaperSize::A4,
            magick_binary: "magick".to_string(),
            temp_dir: None,
            compress_output: true,
        }
    }
}

impl GeneratorConfig {
    /// Load settings from a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(path = %path.as_ref().display(), "Loaded generator config");
        Ok(config)
    }

    /// Blur strengths unless a request overrides them.
    pub fn blur_options(&self) -> BlurOptions {
        BlurOptions {
            text_blur: self.text_blur_strength,
            image_blur: self.image_blur_sigma,
        }
    }
}
