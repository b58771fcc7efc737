// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the end-to-end tests: synthetic source documents, test
// images, and helpers for inspecting generated pages.

#![allow(dead_code)]

use std::sync::Arc;

use formwerk_core::{
    FontRegistry, GenerationRequest, GeneratorConfig, MemoryAssetStore, MemoryFontRegistry,
};
use formwerk_document::{DocumentComposer, RasterBlur, StubRasterBlur};
use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// A Letter-sized source document with `pages` pages of placeholder content.
pub fn source_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"0.9 g 20 20 572 752 re f".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => Dictionary::new(),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialise source");
    bytes
}

/// A solid PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, Rgba([40, 90, 160, 255]))
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

/// Uncompressed output so page content can be inspected as written.
pub fn config() -> GeneratorConfig {
    GeneratorConfig {
        compress_output: false,
        ..GeneratorConfig::default()
    }
}

pub fn composer(assets: MemoryAssetStore, raster: Arc<dyn RasterBlur>) -> DocumentComposer {
    composer_with_fonts(assets, raster, Arc::new(MemoryFontRegistry::new()))
}

pub fn composer_with_fonts(
    assets: MemoryAssetStore,
    raster: Arc<dyn RasterBlur>,
    fonts: Arc<dyn FontRegistry>,
) -> DocumentComposer {
    DocumentComposer::new(config(), fonts, Arc::new(assets), raster)
}

pub fn stub() -> Arc<dyn RasterBlur> {
    Arc::new(StubRasterBlur::new())
}

pub fn request(pairs: &[(&str, &str)]) -> GenerationRequest {
    GenerationRequest::new(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

/// Page ids in order.
pub fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Decoded content operations of page `index`.
pub fn operations(doc: &Document, index: usize) -> Vec<Operation> {
    let page_id = pages(doc)[index];
    let content = doc.get_page_content(page_id).expect("page content");
    Content::decode(&content).expect("decodable content").operations
}

pub fn count(ops: &[Operation], operator: &str) -> usize {
    ops.iter().filter(|op| op.operator == operator).count()
}

pub fn find<'a>(ops: &'a [Operation], operator: &str) -> Vec<&'a Operation> {
    ops.iter().filter(|op| op.operator == operator).collect()
}

pub fn floats(op: &Operation) -> Vec<f32> {
    op.operands
        .iter()
        .map(|operand| operand.as_float().expect("numeric operand"))
        .collect()
}

/// Strings shown with `Tj` on page `index`.
pub fn shown_text(doc: &Document, index: usize) -> Vec<Vec<u8>> {
    find(&operations(doc, index), "Tj")
        .into_iter()
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

/// The font dictionary a `Tf` resource name refers to on page `index`.
pub fn font_for_resource<'a>(doc: &'a Document, index: usize, name: &[u8]) -> &'a Dictionary {
    let page = doc.get_dictionary(pages(doc)[index]).expect("page");
    let resources = page
        .get(b"Resources")
        .and_then(Object::as_dict)
        .expect("inline resources");
    let fonts = resources
        .get(b"Font")
        .and_then(Object::as_dict)
        .expect("font resources");
    let font_id = fonts
        .get(name)
        .and_then(Object::as_reference)
        .expect("font reference");
    doc.get_dictionary(font_id).expect("font dictionary")
}

pub fn base_font(font: &Dictionary) -> String {
    let name = font
        .get(b"BaseFont")
        .and_then(Object::as_name)
        .expect("base font");
    String::from_utf8_lossy(name).into_owned()
}
