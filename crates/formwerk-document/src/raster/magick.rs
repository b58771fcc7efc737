// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ImageMagick rasteriser — pipes the transient surface through `magick` and
// falls back to a per-call scratch directory when piping fails.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use formwerk_core::GeneratorConfig;
use formwerk_core::error::{FormwerkError, Result};
use image::{ImageFormat, RgbaImage};
use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use super::backend::RasterBlur;

/// Rasterises through an external `magick` binary. Blurring runs in-process.
#[derive(Debug, Clone)]
pub struct MagickRasterBlur {
    binary: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl MagickRasterBlur {
    pub fn new(binary: impl Into<PathBuf>, temp_dir: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            temp_dir,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(&config.magick_binary, config.temp_dir.clone())
    }

    fn tool(&self) -> String {
        self.binary.display().to_string()
    }

    fn piped(&self, pdf: &[u8], dpi: u32) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.binary)
            .args(["-density", &dpi.to_string(), "pdf:-"])
            .args(FLATTEN_ARGS)
            .arg("png:-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.failure(format!("failed to start: {err}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.failure("stdin not captured".to_string()))?;

        // Feed stdin from a second thread so a full stdout pipe cannot
        // deadlock the child.
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(pdf));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = match output {
            (Ok(output), Ok(())) => output,
            (Ok(output), Err(err)) if output.status.success() => {
                debug!(error = %err, "Child closed stdin early");
                output
            }
            (Ok(output), Err(err)) => {
                return Err(self.failure(format!("{err}; {}", stderr_of(&output))));
            }
            (Err(err), _) => return Err(self.failure(format!("failed to wait: {err}"))),
        };
        self.check(&output)?;
        Ok(output.stdout)
    }

    fn via_files(&self, pdf: &[u8], dpi: u32) -> Result<Vec<u8>> {
        let scratch = TransientDir::create(self.temp_dir.as_deref())?;
        let surface = scratch.path().join("surface.pdf");
        let raster = scratch.path().join("surface.png");
        std::fs::write(&surface, pdf)?;

        let output = Command::new(&self.binary)
            .args(["-density", &dpi.to_string()])
            .arg(format!("{}[0]", surface.display()))
            .args(FLATTEN_ARGS)
            .arg(&raster)
            .output()
            .map_err(|err| self.failure(format!("failed to start: {err}")))?;
        self.check(&output)?;

        Ok(std::fs::read(&raster)?)
    }

    fn check(&self, output: &Output) -> Result<()> {
        if output.status.success() {
            Ok(())
        } else {
            Err(self.failure(format!("{}: {}", output.status, stderr_of(output))))
        }
    }

    fn failure(&self, detail: String) -> FormwerkError {
        FormwerkError::ExternalTool {
            tool: self.tool(),
            detail,
        }
    }
}

/// Composite onto white and drop the alpha channel.
const FLATTEN_ARGS: [&str; 6] = ["-background", "white", "-alpha", "remove", "-alpha", "off"];

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

impl RasterBlur for MagickRasterBlur {
    fn name(&self) -> &str {
        "magick"
    }

    #[instrument(skip(self, pdf), fields(pdf_len = pdf.len()))]
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<RgbaImage> {
        let png = match self.piped(pdf, dpi) {
            Ok(png) if !png.is_empty() => png,
            Ok(_) => {
                warn!("Piped rasterisation produced no output, retrying via files");
                self.via_files(pdf, dpi)?
            }
            Err(err) => {
                warn!(error = %err, "Piped rasterisation failed, retrying via files");
                self.via_files(pdf, dpi)?
            }
        };

        let image = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .map_err(|err| FormwerkError::Raster(format!("unreadable raster output: {err}")))?;
        debug!(width = image.width(), height = image.height(), "Surface rasterised");
        Ok(image.to_rgba8())
    }
}

/// Scratch directory unique to one rasterisation, removed on drop.
pub struct TransientDir {
    dir: Option<TempDir>,
}

impl TransientDir {
    /// Create under `parent`, or the system temp directory.
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let prefix = format!("formwerk-{}-", chrono::Utc::now().format("%Y%m%d%H%M%S%3f"));
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!(path = %dir.path().display(), "Transient directory created");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for TransientDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                warn!(path = %path.display(), error = %err, "Failed to remove transient directory");
            }
        }
    }
}
