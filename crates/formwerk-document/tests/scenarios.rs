// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end generation scenarios against synthetic source documents.

mod common;

use common::*;
use formwerk_core::{Diagnostic, MemoryAssetStore, Template};
use lopdf::{Document, Object};

fn name_template() -> Template {
    Template::from_json(
        r#"{
            "name": "Badge",
            "file": "badge.pdf",
            "fields": {
                "name": {
                    "label": "Name",
                    "type": "text",
                    "positions": [
                        {"page": 0, "x": 50, "y": 700, "font": "Helvetica", "fontSize": 12}
                    ]
                }
            }
        }"#,
    )
    .unwrap()
}

fn badge_assets() -> MemoryAssetStore {
    MemoryAssetStore::new().with_file("badge.pdf", source_pdf(1))
}

#[test]
fn plain_text_run_is_placed() {
    let template = name_template();
    let mut req = request(&[("name", "Ada")]);
    req.field_visibility.insert("name".into(), true);
    req.field_blur.insert("name".into(), false);

    let out = composer(badge_assets(), stub()).generate(&template, &req).unwrap();
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.page_count, 1);

    let doc = Document::load_mem(&out.bytes).unwrap();
    assert_eq!(shown_text(&doc, 0), vec![b"Ada".to_vec()]);

    let ops = operations(&doc, 0);
    let td = find(&ops, "Td");
    assert_eq!(td.len(), 1);
    assert_eq!(floats(td[0]), vec![50.0, 700.0]);

    let tf = find(&ops, "Tf");
    assert_eq!(tf.len(), 1);
    let resource = tf[0].operands[0].as_name().unwrap();
    assert_eq!(tf[0].operands[1].as_float().unwrap(), 12.0);
    assert_eq!(base_font(font_for_resource(&doc, 0, resource)), "Helvetica");
}

#[test]
fn blurred_text_becomes_a_patch() {
    let template = name_template();
    let mut req = request(&[("name", "Ada")]);
    req.field_blur.insert("name".into(), true);

    let out = composer(badge_assets(), stub()).generate(&template, &req).unwrap();
    assert!(out.diagnostics.is_empty());

    let doc = Document::load_mem(&out.bytes).unwrap();
    assert!(shown_text(&doc, 0).is_empty());

    let ops = operations(&doc, 0);
    assert_eq!(count(&ops, "Do"), 1);
    // The patch is anchored at the text position.
    let cm = find(&ops, "cm");
    assert_eq!(&floats(cm[0])[4..], &[50.0, 700.0]);

    let content = doc.get_page_content(pages(&doc)[0]).unwrap();
    assert!(!content.windows(3).any(|window| window == b"Ada"));
}

#[test]
fn hidden_field_leaves_document_untouched() {
    let template = Template::from_json(
        r#"{
            "file": "badge.pdf",
            "fields": {
                "name": {
                    "positions": [
                        {"page": 0, "x": 50, "y": 700},
                        {"page": 1, "x": 50, "y": 700}
                    ]
                }
            }
        }"#,
    )
    .unwrap();
    let mut req = request(&[("name", "Ada")]);
    req.field_visibility.insert("name".into(), false);

    let out = composer(badge_assets(), stub()).generate(&template, &req).unwrap();
    assert_eq!(out.page_count, 1);

    let doc = Document::load_mem(&out.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let ops = operations(&doc, 0);
    assert_eq!(count(&ops, "Tj"), 0);
    assert_eq!(count(&ops, "q"), 0);
}

#[test]
fn image_is_scaled_and_rotated_about_its_anchor() {
    let template = Template::from_json(
        r#"{
            "file": "badge.pdf",
            "fields": {
                "photo": {
                    "type": "image",
                    "positions": [{"page": 0, "x": 300, "y": 400, "scale": 50, "rotation": 90}]
                }
            }
        }"#,
    )
    .unwrap();
    let assets = badge_assets().with_file("photo.png", png(200, 100));
    let req = request(&[("photo", "photo.png")]);

    let out = composer(assets, stub()).generate(&template, &req).unwrap();
    assert!(out.diagnostics.is_empty());

    let doc = Document::load_mem(&out.bytes).unwrap();
    let ops = operations(&doc, 0);
    let cm = find(&ops, "cm");
    assert_eq!(cm.len(), 2);
    assert_eq!(floats(cm[0]), vec![0.0, 1.0, -1.0, 0.0, 300.0, 400.0]);
    assert_eq!(floats(cm[1]), vec![100.0, 0.0, 0.0, 50.0, 0.0, 0.0]);

    let name = find(&ops, "Do")[0].operands[0].as_name().unwrap().to_vec();
    let page = doc.get_dictionary(pages(&doc)[0]).unwrap();
    let xobjects = page
        .get(b"Resources")
        .and_then(Object::as_dict)
        .and_then(|resources| resources.get(b"XObject"))
        .and_then(Object::as_dict)
        .unwrap();
    let image_id = xobjects.get(&name).and_then(Object::as_reference).unwrap();
    let image = doc.get_object(image_id).and_then(Object::as_stream).unwrap();
    assert_eq!(image.dict.get(b"Width").and_then(Object::as_i64).unwrap(), 200);
    assert_eq!(image.dict.get(b"Height").and_then(Object::as_i64).unwrap(), 100);
}

#[test]
fn blurred_image_is_upscaled() {
    let template = Template::from_json(
        r#"{
            "file": "badge.pdf",
            "fields": {
                "photo": {"type": "image", "defaultValue": "photo.png",
                          "positions": [{"page": 0, "x": 10, "y": 10}]}
            }
        }"#,
    )
    .unwrap();
    let assets = badge_assets().with_file("photo.png", png(40, 20));
    let mut req = request(&[]);
    req.field_blur.insert("photo".into(), true);

    let out = composer(assets, stub()).generate(&template, &req).unwrap();
    let doc = Document::load_mem(&out.bytes).unwrap();
    let ops = operations(&doc, 0);
    let cm = find(&ops, "cm");
    assert_eq!(floats(cm[1]), vec![52.0, 0.0, 0.0, 26.0, 0.0, 0.0]);
}

#[test]
fn missing_image_asset_is_reported_and_skipped() {
    let template = Template::from_json(
        r#"{
            "file": "badge.pdf",
            "fields": {
                "photo": {"type": "image", "positions": [{"page": 3, "x": 10, "y": 10}]}
            }
        }"#,
    )
    .unwrap();
    let req = request(&[("photo", "nowhere.png")]);

    let out = composer(badge_assets(), stub()).generate(&template, &req).unwrap();
    // The page is still claimed, just left blank.
    assert_eq!(out.page_count, 2);
    assert!(matches!(
        out.diagnostics.as_slice(),
        [Diagnostic::ImageSkipped { field, .. }] if field == "photo"
    ));

    let doc = Document::load_mem(&out.bytes).unwrap();
    assert_eq!(count(&operations(&doc, 1), "Do"), 0);
}

#[test]
fn skipped_image_keeps_later_fields_on_their_pages() {
    let template = Template::from_json(
        r#"{
            "file": "badge.pdf",
            "fields": {
                "photo": {"type": "image", "positions": [{"page": 3, "x": 10, "y": 10}]},
                "name": {"positions": [{"page": 5, "x": 50, "y": 700}]}
            }
        }"#,
    )
    .unwrap();
    let req = request(&[("photo", "nowhere.png"), ("name", "Ada")]);

    let out = composer(badge_assets(), stub()).generate(&template, &req).unwrap();
    assert_eq!(out.page_count, 3);

    let doc = Document::load_mem(&out.bytes).unwrap();
    assert!(shown_text(&doc, 1).is_empty());
    assert_eq!(shown_text(&doc, 2), vec![b"Ada".to_vec()]);
}

#[test]
fn compressed_output_is_readable() {
    let template = name_template();
    let req = request(&[("name", "Ada")]);
    let composer = formwerk_document::DocumentComposer::new(
        formwerk_core::GeneratorConfig::default(),
        std::sync::Arc::new(formwerk_core::MemoryFontRegistry::new()),
        std::sync::Arc::new(badge_assets()),
        stub(),
    );

    let out = composer.generate(&template, &req).unwrap();
    let mut doc = Document::load_mem(&out.bytes).unwrap();
    doc.decompress();
    assert_eq!(shown_text(&doc, 0), vec![b"Ada".to_vec()]);
}
