// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster capability — turns a transient PDF surface into pixels and applies
// the low-pass filter used for redaction.

use formwerk_core::error::{FormwerkError, Result};
use image::RgbaImage;
use imageproc::filter::gaussian_blur_f32;

/// Rasterise-and-blur capability the blur pipeline is written against.
///
/// Implementations must be deterministic for the same input and radius.
pub trait RasterBlur: Send + Sync {
    /// Short name for logs (e.g. "magick", "stub").
    fn name(&self) -> &str;

    /// Rasterise the first page of `pdf` at `dpi`.
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<RgbaImage>;

    /// Low-pass filter `image` with the given radius.
    fn blur(&self, image: &RgbaImage, sigma: f32) -> Result<RgbaImage> {
        gaussian(image, sigma)
    }
}

/// Gaussian blur in-process. A non-positive radius returns the image as is.
pub fn gaussian(image: &RgbaImage, sigma: f32) -> Result<RgbaImage> {
    if !sigma.is_finite() {
        return Err(FormwerkError::Raster(format!("invalid blur radius {sigma}")));
    }
    if sigma <= 0.0 {
        return Ok(image.clone());
    }
    Ok(gaussian_blur_f32(image, sigma))
}
