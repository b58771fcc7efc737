// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document composer — one generation call: load the template's source
// document, preload fonts and images, render every field, and serialise.

use std::sync::Arc;

use formwerk_core::error::{FormwerkError, Result};
use formwerk_core::{
    AssetStore, BlurOptions, Diagnostic, Field, FontRegistry, GenerationRequest, GeneratorConfig,
    ImageField, Template,
};
use lopdf::Document;
use tracing::{Span, debug, info, instrument, warn};
use uuid::Uuid;

use crate::context::GenerationContext;
use crate::pdf::content::embed_raster;
use crate::raster::{BlurPipeline, ImageProcessor, MagickRasterBlur, RasterBlur};
use crate::render::FieldRenderer;

/// Output of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    /// Degraded operations absorbed along the way.
    pub diagnostics: Vec<Diagnostic>,
    pub page_count: usize,
}

/// Fills templates. Holds only read-only collaborators, so one composer can
/// serve any number of concurrent calls.
pub struct DocumentComposer {
    config: GeneratorConfig,
    fonts: Arc<dyn FontRegistry>,
    assets: Arc<dyn AssetStore>,
    raster: Arc<dyn RasterBlur>,
}

impl DocumentComposer {
    pub fn new(
        config: GeneratorConfig,
        fonts: Arc<dyn FontRegistry>,
        assets: Arc<dyn AssetStore>,
        raster: Arc<dyn RasterBlur>,
    ) -> Self {
        Self {
            config,
            fonts,
            assets,
            raster,
        }
    }

    /// Composer rasterising through the configured `magick` binary.
    pub fn with_magick(
        config: GeneratorConfig,
        fonts: Arc<dyn FontRegistry>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let raster = Arc::new(MagickRasterBlur::from_config(&config));
        Self::new(config, fonts, assets, raster)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Fill `template` with `request`.
    ///
    /// Only an unreadable or corrupt source document fails the call. Font,
    /// image, and blur problems are absorbed and reported as diagnostics.
    #[instrument(
        skip_all,
        fields(template = %template.name, call_id = %Uuid::new_v4())
    )]
    pub fn generate(&self, template: &Template, request: &GenerationRequest) -> Result<GeneratedDocument> {
        info!(
            fields = template.fields.len(),
            backend = self.raster.name(),
            "Generating document"
        );

        let document = self.load_source(&template.source_file)?;
        let mut ctx = GenerationContext::new(
            document,
            self.config.appended_page_size.dimensions_pt(),
            Arc::clone(&self.fonts),
            &self.config.default_font,
        )
        .map_err(|err| {
            FormwerkError::SourceDocument(format!("{}: {err}", template.source_file))
        })?;

        let blur = request
            .blur_options
            .unwrap_or_else(|| self.config.blur_options());
        let pipeline = BlurPipeline::new(
            Arc::clone(&self.raster),
            Arc::clone(&self.fonts),
            ctx.fonts.default_font(),
            self.config.raster_dpi,
            self.config.image_upscale,
        );

        self.preload(&mut ctx, &pipeline, template, request, blur);

        debug!("Rendering fields");
        let renderer = FieldRenderer::new(&pipeline, blur.text_blur, self.config.default_font_size);
        for field in &template.fields {
            renderer.render(
                &mut ctx,
                field,
                field.resolve_value(request),
                request.is_visible(field.key()),
                request.is_blurred(field.key()),
            )?;
        }

        let page_count = ctx.pages.page_count();
        let (bytes, diagnostics) = ctx.serialize(self.config.compress_output)?;

        info!(
            bytes = bytes.len(),
            pages = page_count,
            diagnostics = diagnostics.len(),
            "Document generated"
        );
        Ok(GeneratedDocument {
            bytes,
            diagnostics,
            page_count,
        })
    }

    /// [`DocumentComposer::generate`] on tokio's blocking pool.
    pub async fn generate_async(
        self: Arc<Self>,
        template: Arc<Template>,
        request: GenerationRequest,
    ) -> Result<GeneratedDocument> {
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| self.generate(&template, &request)))
            .await
            .map_err(|err| {
                FormwerkError::Io(std::io::Error::other(format!("generation task failed: {err}")))
            })?
    }

    fn load_source(&self, source_file: &str) -> Result<Document> {
        let bytes = self.assets.read(source_file).map_err(|err| {
            FormwerkError::SourceDocument(format!("cannot read {source_file}: {err}"))
        })?;
        let document = Document::load_mem(&bytes).map_err(|err| {
            FormwerkError::SourceDocument(format!("cannot parse {source_file}: {err}"))
        })?;
        if document.is_encrypted() {
            return Err(FormwerkError::SourceDocument(format!(
                "{source_file} is encrypted"
            )));
        }
        debug!(pages = document.get_pages().len(), "Source document loaded");
        Ok(document)
    }

    /// Resolve every font and load every image the visible fields use.
    fn preload(
        &self,
        ctx: &mut GenerationContext,
        pipeline: &BlurPipeline,
        template: &Template,
        request: &GenerationRequest,
        blur: BlurOptions,
    ) {
        for field in &template.fields {
            if !request.is_visible(field.key()) {
                debug!(field = %field.key(), "Skipping hidden field");
                continue;
            }
            match field {
                Field::Text(text) => {
                    for position in &text.positions {
                        ctx.fonts.resolve(
                            &mut ctx.document,
                            text.font_for(position),
                            &mut ctx.diagnostics,
                        );
                    }
                }
                Field::Image(image) => {
                    let value = field.resolve_value(request);
                    let blurred = request.is_blurred(field.key());
                    self.preload_image(ctx, pipeline, image, value, blurred, blur.image_blur);
                }
            }
        }
        debug!(fonts = ctx.fonts.len(), images = ctx.images.len(), "Preload complete");
    }

    fn preload_image(
        &self,
        ctx: &mut GenerationContext,
        pipeline: &BlurPipeline,
        field: &ImageField,
        value: &str,
        blurred: bool,
        sigma: f32,
    ) {
        if value.trim().is_empty() {
            debug!(field = %field.key, "No image value");
            return;
        }

        let loaded = self.assets.read(value).and_then(|bytes| {
            let raster = if blurred {
                pipeline.blur_image(&bytes, sigma)?
            } else {
                ImageProcessor::from_bytes(&bytes)?.into_rgba()
            };
            embed_raster(&mut ctx.document, &raster)
        });

        match loaded {
            Ok(embedded) => {
                debug!(field = %field.key, blurred, "Image cached");
                ctx.images.insert(field.key.clone(), embedded);
            }
            Err(err) => {
                warn!(field = %field.key, image = value, error = %err, "Image skipped");
                ctx.diagnostics.push(Diagnostic::ImageSkipped {
                    field: field.key.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
}
