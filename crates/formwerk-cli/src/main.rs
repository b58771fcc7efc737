// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Formwerk — command-line PDF template filler
//
// Entry point. Initialises logging, loads configuration, the template and the
// form submission, runs one generation and writes the output document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use formwerk_core::error::{FormwerkError, Result};
use formwerk_core::{
    CatalogFontRegistry, DirectoryAssetStore, FontRegistry, GenerationRequest, GeneratorConfig,
    MemoryFontRegistry, Template,
};
use formwerk_document::DocumentComposer;
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "formwerk", version, about = "Fill a PDF form template")]
struct Args {
    /// Template JSON: a single template, or a catalog object keyed by id.
    #[arg(long)]
    template: PathBuf,

    /// Template id to pick when `--template` is a catalog.
    #[arg(long)]
    id: Option<String>,

    /// Submission JSON (`formData`, `fieldVisibility`, `fieldBlur`, `blurOptions`).
    #[arg(long)]
    request: Option<PathBuf>,

    /// Blur the named field (repeatable).
    #[arg(long = "blur", value_name = "KEY")]
    blur: Vec<String>,

    /// Hide the named field (repeatable).
    #[arg(long = "hide", value_name = "KEY")]
    hide: Vec<String>,

    /// Directory holding source documents and images.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Directory holding `fonts.json` and the font files it lists.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Generator configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the generated document.
    #[arg(short, long, default_value = "filled.pdf")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Generation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    let template = load_template(&args.template, args.id.as_deref())?;
    let request = load_request(args)?;
    template.validate(&request)?;

    let fonts: Arc<dyn FontRegistry> = match &args.fonts {
        Some(dir) => Arc::new(CatalogFontRegistry::open(dir)?),
        None => Arc::new(MemoryFontRegistry::new()),
    };
    let composer = DocumentComposer::with_magick(
        config,
        fonts,
        Arc::new(DirectoryAssetStore::new(&args.assets)),
    );

    let generated = composer.generate(&template, &request)?;
    for diagnostic in &generated.diagnostics {
        warn!(%diagnostic, "Degraded");
    }

    std::fs::write(&args.output, &generated.bytes)?;
    info!(
        output = %args.output.display(),
        pages = generated.page_count,
        bytes = generated.bytes.len(),
        sha256 = %hex::encode(Sha256::digest(&generated.bytes)),
        "Wrote document"
    );
    Ok(())
}

fn load_template(path: &Path, id: Option<&str>) -> Result<Template> {
    let raw = std::fs::read_to_string(path)?;
    let Some(id) = id else {
        return Template::from_json(&raw);
    };

    // Entries stay raw so each template's field order survives.
    let mut catalog: HashMap<String, Box<RawValue>> = serde_json::from_str(&raw)?;
    let entry = catalog.remove(id).ok_or_else(|| {
        FormwerkError::InvalidTemplate(format!("no template '{id}' in {}", path.display()))
    })?;
    Template::from_json(entry.get())
}

fn load_request(args: &Args) -> Result<GenerationRequest> {
    let mut request = match &args.request {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GenerationRequest::default(),
    };
    for key in &args.blur {
        request.field_blur.insert(key.clone(), true);
    }
    for key in &args.hide {
        request.field_visibility.insert(key.clone(), false);
    }
    Ok(request)
}
