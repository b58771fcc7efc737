// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asset stores — source documents and uploaded images by file name.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{FormwerkError, Result};

/// Read-only byte lookup by file name.
pub trait AssetStore: Send + Sync {
    /// Bytes of `name`, or [`FormwerkError::AssetNotFound`].
    fn read(&self, name: &str) -> Result<Vec<u8>>;
}

impl<T: AssetStore + ?Sized> AssetStore for Arc<T> {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        (**self).read(name)
    }
}

/// Assets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn with_file(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl AssetStore for MemoryAssetStore {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| FormwerkError::AssetNotFound(name.to_string()))
    }
}

/// Assets stored as plain files under one directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssetStore {
    root: PathBuf,
}

impl DirectoryAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain relative names resolve; anything escaping the root does not.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        (plain && !name.is_empty()).then(|| self.root.join(relative))
    }
}

impl AssetStore for DirectoryAssetStore {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(name)
            .ok_or_else(|| FormwerkError::AssetNotFound(name.to_string()))?;
        debug!(path = %path.display(), "Reading asset");
        std::fs::read(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => FormwerkError::AssetNotFound(name.to_string()),
            _ => FormwerkError::Io(err),
        })
    }
}
