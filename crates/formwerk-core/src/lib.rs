// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Formwerk — Core types, errors, and collaborator traits shared across all crates.

pub mod assets;
pub mod config;
pub mod error;
pub mod registry;
pub mod template;
pub mod types;

pub use assets::{AssetStore, DirectoryAssetStore, MemoryAssetStore};
pub use config::GeneratorConfig;
pub use error::FormwerkError;
pub use registry::{CatalogFontRegistry, FontRegistry, MemoryFontRegistry};
pub use template::{Field, ImageField, ImagePosition, Template, TextField, TextPosition};
pub use types::*;
