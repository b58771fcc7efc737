// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the formwerk-document crate.
// Covers plain overlay generation and the blur pipeline with the stub
// rasteriser, so no external tool is needed.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use formwerk_core::{
    GenerationRequest, GeneratorConfig, MemoryAssetStore, MemoryFontRegistry, Template,
};
use formwerk_document::{DocumentComposer, StubRasterBlur};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn source_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0.9 g".to_vec()));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            }))
        })
        .collect();
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

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, Rgba([200, 60, 60, 255]))
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

fn composer() -> DocumentComposer {
    let assets = MemoryAssetStore::new()
        .with_file("form.pdf", source_pdf(2))
        .with_file("photo.png", png(120, 80));
    DocumentComposer::new(
        GeneratorConfig::default(),
        Arc::new(MemoryFontRegistry::new()),
        Arc::new(assets),
        Arc::new(StubRasterBlur::new()),
    )
}

fn template() -> Template {
    Template::from_json(
        r#"{"file": "form.pdf", "fields": {
            "name": {"positions": [{"page": 0, "x": 72, "y": 700}, {"page": 1, "x": 72, "y": 700}]},
            "city": {"font": "TimesRoman", "positions": [{"page": 0, "x": 72, "y": 680}]},
            "photo": {"type": "image", "positions": [{"page": 0, "x": 400, "y": 600, "scale": 50}]}
        }}"#,
    )
    .expect("template")
}

fn request(blur: bool) -> GenerationRequest {
    let mut request = GenerationRequest::new(
        [("name", "Ada Lovelace"), ("city", "London"), ("photo", "photo.png")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    if blur {
        request.field_blur.insert("name".into(), true);
        request.field_blur.insert("photo".into(), true);
    }
    request
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_plain_overlay(c: &mut Criterion) {
    let composer = composer();
    let template = template();
    let request = request(false);

    c.bench_function("generate (plain overlay)", |b| {
        b.iter(|| {
            let out = composer
                .generate(black_box(&template), black_box(&request))
                .expect("generate");
            black_box(out.bytes);
        });
    });
}

fn bench_blurred_overlay(c: &mut Criterion) {
    let composer = composer();
    let template = template();
    let request = request(true);

    let mut group = c.benchmark_group("blur");
    group.sample_size(10);
    group.bench_function("generate (blurred text and image)", |b| {
        b.iter(|| {
            let out = composer
                .generate(black_box(&template), black_box(&request))
                .expect("generate");
            black_box(out.bytes);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_plain_overlay, bench_blurred_overlay);
criterion_main!(benches);
