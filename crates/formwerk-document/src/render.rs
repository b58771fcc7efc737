// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Field renderer — draws one field's resolved value at each of its positions,
// as plain text, a blurred text patch, or an image.

use formwerk_core::error::{FormwerkError, Result};
use formwerk_core::{Diagnostic, Field, ImageField, TextField, TextPosition};
use lopdf::ObjectId;
use tracing::{debug, instrument, warn};

use crate::context::GenerationContext;
use crate::pdf::content::{
    append_content, embed_raster, font_resource_name, image_operations, image_resource_name,
    register_resource, text_operations,
};
use crate::pdf::{EmbeddedImage, ResourceCategory};
use crate::raster::{BlurPipeline, RasterPatch};

/// Draws fields into a [`GenerationContext`].
pub struct FieldRenderer<'a> {
    pipeline: &'a BlurPipeline,
    text_blur: f32,
    default_font_size: f32,
}

impl<'a> FieldRenderer<'a> {
    pub fn new(pipeline: &'a BlurPipeline, text_blur: f32, default_font_size: f32) -> Self {
        Self {
            pipeline,
            text_blur,
            default_font_size,
        }
    }

    /// Draw `field` with its resolved `value`.
    ///
    /// Invisible fields, blank text, and images absent from the cache draw
    /// nothing and leave the page table untouched.
    #[instrument(skip(self, ctx, field, value), fields(field = %field.key()))]
    pub fn render(
        &self,
        ctx: &mut GenerationContext,
        field: &Field,
        value: &str,
        visible: bool,
        blurred: bool,
    ) -> Result<()> {
        if !visible {
            debug!("Field hidden");
            return Ok(());
        }
        match field {
            Field::Text(text) => self.render_text(ctx, text, value, blurred),
            Field::Image(image) => self.render_image(ctx, image),
        }
    }

    fn render_text(
        &self,
        ctx: &mut GenerationContext,
        field: &TextField,
        value: &str,
        blurred: bool,
    ) -> Result<()> {
        if value.trim().is_empty() {
            debug!("No value to draw");
            return Ok(());
        }

        for position in &field.positions {
            let page_id = self.target_page(ctx, position.page)?;
            let font = field.font_for(position);
            let size = self.effective_size(field.font_size_for(position));

            if blurred {
                match self.blurred_patch(ctx, value, position, font, size) {
                    Ok(patch) => {
                        draw_patch(ctx, page_id, &patch)?;
                        continue;
                    }
                    Err(err) => {
                        warn!(
                            field = %field.key,
                            page = position.page,
                            error = %err,
                            "Text blur failed, drawing plain text"
                        );
                        ctx.diagnostics.push(Diagnostic::BlurFallback {
                            field: field.key.clone(),
                            page: position.page,
                            reason: err.to_string(),
                        });
                    }
                }
            }

            draw_text(ctx, page_id, &field.key, value, font, size, position)?;
        }
        Ok(())
    }

    fn render_image(&self, ctx: &mut GenerationContext, field: &ImageField) -> Result<()> {
        let image = ctx.images.get(&field.key).copied();
        if image.is_none() {
            debug!("No image loaded for field");
        }

        // Pages are claimed even when there is nothing to draw, so later
        // fields land where they would with the image present.
        for position in &field.positions {
            let Some(image) = image else {
                ctx.pages.page_for(&mut ctx.document, position.page)?;
                continue;
            };
            let page_id = self.target_page(ctx, position.page)?;
            draw_image(ctx, page_id, image, position.x, position.y, position.scale, position.rotation)?;
        }
        Ok(())
    }

    fn target_page(&self, ctx: &mut GenerationContext, index: u32) -> Result<ObjectId> {
        let page_id = ctx.pages.page_for(&mut ctx.document, index)?;
        ctx.pages.isolate_existing_content(&mut ctx.document, page_id)?;
        Ok(page_id)
    }

    fn effective_size(&self, size: f32) -> f32 {
        if size.is_finite() && size > 0.0 {
            size
        } else {
            self.default_font_size
        }
    }

    fn blurred_patch(
        &self,
        ctx: &mut GenerationContext,
        value: &str,
        position: &TextPosition,
        font: &str,
        size: f32,
    ) -> Result<RasterPatch> {
        let resolved = ctx.fonts.resolve(&mut ctx.document, font, &mut ctx.diagnostics);
        self.pipeline
            .blur_text(value, position.x, position.y, size, resolved, self.text_blur)
    }
}

fn draw_text(
    ctx: &mut GenerationContext,
    page_id: ObjectId,
    field: &str,
    value: &str,
    font: &str,
    size: f32,
    position: &TextPosition,
) -> Result<()> {
    let resolved = ctx.fonts.resolve(&mut ctx.document, font, &mut ctx.diagnostics);
    let (operand, lossy) = resolved.encode(value, false).map_err(|ch| {
        FormwerkError::PdfError(format!("cannot encode {ch:?} with {}", resolved.identifier()))
    })?;
    let font_id = resolved.object_id();

    if lossy {
        warn!(field, font, "Substituted characters the font cannot encode");
        ctx.diagnostics.push(Diagnostic::TextSubstituted {
            field: field.to_string(),
            font: font.to_string(),
        });
    }

    let name = font_resource_name(font_id);
    register_resource(&mut ctx.document, page_id, ResourceCategory::Font, &name, font_id)?;
    append_content(
        &mut ctx.document,
        page_id,
        text_operations(&name, size, position.x, position.y, operand),
    )?;
    debug!(page = position.page, x = position.x, y = position.y, font, size, "Text placed");
    Ok(())
}

fn draw_patch(ctx: &mut GenerationContext, page_id: ObjectId, patch: &RasterPatch) -> Result<()> {
    let embedded = embed_raster(&mut ctx.document, &patch.image)?;
    let name = image_resource_name(embedded.object_id);
    register_resource(
        &mut ctx.document,
        page_id,
        ResourceCategory::XObject,
        &name,
        embedded.object_id,
    )?;
    append_content(
        &mut ctx.document,
        page_id,
        image_operations(&name, patch.x, patch.y, patch.width, patch.height, 0.0),
    )?;
    debug!(x = patch.x, y = patch.y, "Blurred patch placed");
    Ok(())
}

fn draw_image(
    ctx: &mut GenerationContext,
    page_id: ObjectId,
    image: EmbeddedImage,
    x: f32,
    y: f32,
    scale: f32,
    rotation: f32,
) -> Result<()> {
    let factor = scale / 100.0;
    let width = image.width as f32 * factor;
    let height = image.height as f32 * factor;

    let name = image_resource_name(image.object_id);
    register_resource(
        &mut ctx.document,
        page_id,
        ResourceCategory::XObject,
        &name,
        image.object_id,
    )?;
    append_content(
        &mut ctx.document,
        page_id,
        image_operations(&name, x, y, width, height, rotation),
    )?;
    debug!(x, y, width, height, rotation, "Image placed");
    Ok(())
}
