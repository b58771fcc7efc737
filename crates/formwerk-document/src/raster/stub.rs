// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub rasteriser for tests and environments without ImageMagick.
//
// Produces a white canvas the size of the surface's first page with a black
// band where the text would be. Optionally fails every call.

use std::sync::atomic::{AtomicUsize, Ordering};

use formwerk_core::error::{FormwerkError, Result};
use image::{Rgba, RgbaImage};
use lopdf::{Document, Object, ObjectId};

use super::backend::{RasterBlur, gaussian};

/// Deterministic in-process [`RasterBlur`].
#[derive(Debug, Default)]
pub struct StubRasterBlur {
    failure: Option<String>,
    rasterized: AtomicUsize,
    blurred: AtomicUsize,
}

impl StubRasterBlur {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn rasterize_calls(&self) -> usize {
        self.rasterized.load(Ordering::SeqCst)
    }

    pub fn blur_calls(&self) -> usize {
        self.blurred.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(FormwerkError::Raster(reason.clone())),
            None => Ok(()),
        }
    }
}

impl RasterBlur for StubRasterBlur {
    fn name(&self) -> &str {
        "stub"
    }

    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<RgbaImage> {
        self.rasterized.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let doc = Document::load_mem(pdf)
            .map_err(|err| FormwerkError::Raster(format!("unreadable surface: {err}")))?;
        let page = doc
            .get_pages()
            .into_values()
            .next()
            .ok_or_else(|| FormwerkError::Raster("surface has no pages".to_string()))?;
        let (width_pt, height_pt) = media_box(&doc, page).unwrap_or((612.0, 792.0));

        let scale = dpi as f32 / 72.0;
        let width = ((width_pt * scale).round() as u32).max(1);
        let height = ((height_pt * scale).round() as u32).max(1);
        let band = height / 3..(height - height / 3).max(height / 3 + 1);

        Ok(RgbaImage::from_fn(width, height, |_, y| {
            if band.contains(&y) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        }))
    }

    fn blur(&self, image: &RgbaImage, sigma: f32) -> Result<RgbaImage> {
        self.blurred.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        gaussian(image, sigma)
    }
}

/// Width and height of the page's (possibly inherited) media box.
fn media_box(doc: &Document, page: ObjectId) -> Option<(f32, f32)> {
    let mut node = doc.get_dictionary(page).ok()?;
    for _ in 0..32 {
        if let Ok(Object::Array(values)) = node.get(b"MediaBox") {
            let numbers: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
            if let [x0, y0, x1, y1] = numbers[..] {
                return Some(((x1 - x0).abs(), (y1 - y0).abs()));
            }
            return None;
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::blank_pdf;

    #[test]
    fn canvas_matches_page_size_at_density() {
        let stub = StubRasterBlur::new();
        let image = stub.rasterize(&blank_pdf(1), 144).unwrap();
        assert_eq!(image.dimensions(), (1224, 1584));
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 792).0, [0, 0, 0, 255]);
        assert_eq!(stub.rasterize_calls(), 1);
    }

    #[test]
    fn failing_stub_fails_every_call() {
        let stub = StubRasterBlur::failing("no rasteriser");
        assert!(matches!(
            stub.rasterize(&blank_pdf(1), 72),
            Err(FormwerkError::Raster(reason)) if reason == "no rasteriser"
        ));
        assert!(stub.blur(&RgbaImage::new(2, 2), 1.0).is_err());
        assert_eq!(stub.rasterize_calls(), 1);
        assert_eq!(stub.blur_calls(), 1);
    }

    #[test]
    fn garbage_is_not_a_surface() {
        assert!(StubRasterBlur::new().rasterize(b"not a pdf", 72).is_err());
    }
}
