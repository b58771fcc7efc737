// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode field images, upscale before blurring, and flatten
// rasterised surfaces onto white. Operates on in-memory images using the
// `image` crate.

use formwerk_core::error::{FormwerkError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor`, so steps
/// chain:
///
/// ```ignore
/// let blurred_input = ImageProcessor::from_bytes(&bytes)?
///     .upscale(1.3)
///     .into_rgba();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode PNG or JPEG bytes. The format is detected from the content;
    /// anything else is rejected.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = image::guess_format(data).map_err(|err| {
            FormwerkError::ImageError(format!("unrecognised image data: {err}"))
        })?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(FormwerkError::ImageError(format!(
                "unsupported image format {format:?}, expected PNG or JPEG"
            )));
        }

        let image = image::load_from_memory_with_format(data, format)
            .map_err(|err| FormwerkError::ImageError(format!("failed to decode image: {err}")))?;
        debug!(
            ?format,
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Wrap an already-decoded image.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    // -- Transformations ------------------------------------------------------

    /// Scale both dimensions by `factor` with Lanczos3 filtering. Each
    /// dimension is at least one pixel.
    #[instrument(skip(self))]
    pub fn upscale(self, factor: f32) -> Self {
        if !(factor.is_finite() && factor > 0.0) || (factor - 1.0).abs() < f32::EPSILON {
            return self;
        }
        let width = ((self.image.width() as f32 * factor).round() as u32).max(1);
        let height = ((self.image.height() as f32 * factor).round() as u32).max(1);
        let resized = self.image.resize_exact(width, height, FilterType::Lanczos3);
        debug!(new_w = width, new_h = height, "Upscale complete");
        Self { image: resized }
    }

    /// Composite onto an opaque white background.
    pub fn flatten_on_white(self) -> Self {
        let mut rgba = self.image.into_rgba8();
        for pixel in rgba.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            if a == u8::MAX {
                continue;
            }
            let over = |channel: u8| -> u8 {
                let alpha = a as u32;
                ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
            };
            *pixel = Rgba([over(r), over(g), over(b), u8::MAX]);
        }
        Self::from_rgba(rgba)
    }
}
