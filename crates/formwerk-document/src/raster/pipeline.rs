// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blur pipeline — text is drawn on a transient surface, rasterised, and
// blurred into a patch; images are upscaled and blurred in place of the
// original raster.

use std::sync::Arc;

use formwerk_core::FontRegistry;
use formwerk_core::error::{FormwerkError, Result};
use image::RgbaImage;
use tracing::{debug, instrument};

use super::backend::RasterBlur;
use super::processor::ImageProcessor;
use crate::font::{ResolvedFont, StandardFont};
use crate::pdf::surface::{render_text_surface, surface_font};

/// Patch growth over the measured text box.
const PATCH_SCALE: f32 = 1.2;
/// Padding around the baseline origin, as a fraction of the font size.
const PADDING_RATIO: f32 = 0.2;

/// A blurred raster and where it goes on the page.
#[derive(Debug, Clone)]
pub struct RasterPatch {
    pub image: RgbaImage,
    /// Lower-left corner in page space.
    pub x: f32,
    pub y: f32,
    /// Drawn size in points.
    pub width: f32,
    pub height: f32,
}

pub struct BlurPipeline {
    backend: Arc<dyn RasterBlur>,
    registry: Arc<dyn FontRegistry>,
    default_font: StandardFont,
    dpi: u32,
    upscale: f32,
}

impl BlurPipeline {
    pub fn new(
        backend: Arc<dyn RasterBlur>,
        registry: Arc<dyn FontRegistry>,
        default_font: StandardFont,
        dpi: u32,
        upscale: f32,
    ) -> Self {
        Self {
            backend,
            registry,
            default_font,
            dpi,
            upscale,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Render `text` at `(x, y)` as a blurred patch. The blur radius is
    /// `strength / 4` pixels at the rasterisation density.
    ///
    /// Fails without touching the backend if `font` cannot draw every
    /// character of `text`.
    #[instrument(skip(self, text, font), fields(backend = self.backend.name(), font = font.identifier()))]
    pub fn blur_text(
        &self,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        font: &ResolvedFont,
        strength: f32,
    ) -> Result<RasterPatch> {
        font.check_encodable(text).map_err(|ch| {
            FormwerkError::Raster(format!(
                "font {} cannot draw {ch:?}",
                font.identifier()
            ))
        })?;

        let width = font.measure(text, font_size) * PATCH_SCALE;
        let height = font_size * PATCH_SCALE;
        let padding = (font_size * PADDING_RATIO).ceil();

        let surface_font = surface_font(font, self.registry.as_ref(), self.default_font);
        let surface = render_text_surface(text, &surface_font, font_size, width, height, padding)?;

        let raster = self.backend.rasterize(&surface, self.dpi)?;
        let flat = ImageProcessor::from_rgba(raster).flatten_on_white().into_rgba();
        let image = self.backend.blur(&flat, strength / 4.0)?;

        debug!(
            width,
            height,
            px_w = image.width(),
            px_h = image.height(),
            "Text patch blurred"
        );
        Ok(RasterPatch {
            image,
            x,
            y,
            width,
            height,
        })
    }

    /// Decode an image field's bytes, upscale, and blur with `sigma`.
    #[instrument(skip(self, bytes), fields(backend = self.backend.name(), bytes_len = bytes.len()))]
    pub fn blur_image(&self, bytes: &[u8], sigma: f32) -> Result<RgbaImage> {
        let upscaled = ImageProcessor::from_bytes(bytes)?
            .upscale(self.upscale)
            .into_rgba();
        self.backend.blur(&upscaled, sigma)
    }
}
