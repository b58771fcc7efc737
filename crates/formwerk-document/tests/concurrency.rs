// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Concurrent generation calls sharing one composer.

mod common;

use std::sync::Arc;

use common::*;
use formwerk_core::{MemoryAssetStore, Template};
use lopdf::Document;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_do_not_interfere() {
    let template = Arc::new(
        Template::from_json(
            r#"{"file": "form.pdf", "fields": {
                "name": {"positions": [{"page": 0, "x": 72, "y": 700}]},
                "extra": {"positions": [{"page": 2, "x": 72, "y": 700}]}
            }}"#,
        )
        .unwrap(),
    );
    let assets = MemoryAssetStore::new().with_file("form.pdf", source_pdf(1));
    let composer = Arc::new(composer(assets, stub()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let composer = Arc::clone(&composer);
        let template = Arc::clone(&template);
        // Odd calls write to an appended page as well.
        let mut pairs = vec![("name".to_string(), format!("Person {i}"))];
        if i % 2 == 1 {
            pairs.push(("extra".to_string(), format!("Extra {i}")));
        }
        let request = formwerk_core::GenerationRequest::new(pairs.into_iter().collect());
        handles.push(tokio::spawn(async move {
            (i, composer.generate_async(template, request).await)
        }));
    }

    for handle in handles {
        let (i, result) = handle.await.unwrap();
        let out = result.unwrap();
        let doc = Document::load_mem(&out.bytes).unwrap();
        assert_eq!(shown_text(&doc, 0), vec![format!("Person {i}").into_bytes()]);
        if i % 2 == 1 {
            assert_eq!(out.page_count, 2);
            assert_eq!(shown_text(&doc, 1), vec![format!("Extra {i}").into_bytes()]);
        } else {
            assert_eq!(out.page_count, 1);
        }
    }
}

#[test]
fn repeated_calls_are_independent() {
    let template = Template::from_json(
        r#"{"file": "form.pdf", "fields": {
            "note": {"positions": [{"page": 1, "x": 72, "y": 700}]}
        }}"#,
    )
    .unwrap();
    let assets = MemoryAssetStore::new().with_file("form.pdf", source_pdf(1));
    let composer = composer(assets, stub());

    let first = composer.generate(&template, &request(&[("note", "one")])).unwrap();
    let second = composer.generate(&template, &request(&[("note", "two")])).unwrap();

    // The source is reloaded each call, so the appended page never accumulates.
    assert_eq!(first.page_count, 2);
    assert_eq!(second.page_count, 2);
    let doc = Document::load_mem(&second.bytes).unwrap();
    assert_eq!(shown_text(&doc, 1), vec![b"two".to_vec()]);
}
