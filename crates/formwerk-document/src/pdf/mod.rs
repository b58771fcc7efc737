// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page table, overlay content, and transient text surfaces.

pub mod content;
pub mod page_table;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use content::{EmbeddedImage, ResourceCategory};
pub use page_table::PageTable;
pub use surface::SurfaceFont;
