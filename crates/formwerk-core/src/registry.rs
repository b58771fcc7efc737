// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font registry — read-only lookup of custom font programs by name.
//
// The catalog itself is owned by the admin tooling; this module only reads it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{FormwerkError, Result};

/// Name of the catalog file inside a fonts directory.
pub const FONT_CATALOG_FILE: &str = "fonts.json";

/// Lookup of custom font bytes by identifier.
///
/// Implementations are shared read-only across concurrent generations.
pub trait FontRegistry: Send + Sync {
    /// Font program bytes for `name`, or `Ok(None)` if no such font is
    /// registered.
    fn load(&self, name: &str) -> Result<Option<Arc<Vec<u8>>>>;
}

/// In-memory registry, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryFontRegistry {
    fonts: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryFontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.fonts.insert(name.into(), Arc::new(bytes));
    }

    pub fn with_font(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl FontRegistry for MemoryFontRegistry {
    fn load(&self, name: &str) -> Result<Option<Arc<Vec<u8>>>> {
        Ok(self.fonts.get(name).cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    name: String,
    file: String,
}

/// Registry backed by a fonts directory containing a `fonts.json` catalog
/// of `[{"name": ..., "file": ...}]` entries.
#[derive(Debug, Clone)]
pub struct CatalogFontRegistry {
    root: PathBuf,
    files: HashMap<String, String>,
}

impl CatalogFontRegistry {
    /// Read the catalog in `root`. A missing catalog yields an empty registry.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let catalog_path = root.join(FONT_CATALOG_FILE);

        let files = match std::fs::read_to_string(&catalog_path) {
            Ok(raw) => {
                let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
                entries
                    .into_iter()
                    .map(|entry| (entry.name, entry.file))
                    .collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %catalog_path.display(), "Font catalog missing, registry is empty");
                HashMap::new()
            }
            Err(err) => return Err(err.into()),
        };

        info!(fonts = files.len(), root = %root.display(), "Font catalog loaded");
        Ok(Self { root, files })
    }

    /// Names of all registered fonts.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl FontRegistry for CatalogFontRegistry {
    fn load(&self, name: &str) -> Result<Option<Arc<Vec<u8>>>> {
        let Some(file) = self.files.get(name) else {
            return Ok(None);
        };
        let path = self.root.join(file);
        debug!(font = name, path = %path.display(), "Reading font file");
        let bytes = std::fs::read(&path).map_err(|err| {
            FormwerkError::FontEmbed(format!("cannot read {}: {}", path.display(), err))
        })?;
        Ok(Some(Arc::new(bytes)))
    }
}
