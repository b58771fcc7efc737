// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — rasterise/blur backends, image processing, and the blur
// pipeline.

pub mod backend;
pub mod magick;
pub mod pipeline;
pub mod processor;
pub mod stub;

pub use backend::RasterBlur;
pub use magick::MagickRasterBlur;
pub use pipeline::{BlurPipeline, RasterPatch};
pub use processor::ImageProcessor;
pub use stub::StubRasterBlur;
