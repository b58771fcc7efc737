// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page content — resource registration, overlay content streams, and image
// XObjects written into the output document with `lopdf`.

use formwerk_core::error::{FormwerkError, Result};
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

/// Resource dictionary categories the overlay writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    Font,
    XObject,
}

impl ResourceCategory {
    fn key(self) -> &'static [u8] {
        match self {
            Self::Font => b"Font",
            Self::XObject => b"XObject",
        }
    }
}

/// Resource name for a font object.
pub fn font_resource_name(id: ObjectId) -> String {
    format!("FwF{}", id.0)
}

/// Resource name for an image object.
pub fn image_resource_name(id: ObjectId) -> String {
    format!("FwIm{}", id.0)
}

/// Make `target` available to the page's content as `/name`.
///
/// The page's effective resources (its own, referenced, or inherited) are
/// copied into an inline dictionary first, so shared resource dictionaries
/// are never modified.
pub fn register_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: ResourceCategory,
    name: &str,
    target: ObjectId,
) -> Result<()> {
    let mut resources = effective_resources(doc, page_id)?;

    let mut entries = match resources.get(category.key()) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    };
    entries.set(name.as_bytes().to_vec(), Object::Reference(target));
    resources.set(category.key().to_vec(), Object::Dictionary(entries));

    page_dictionary(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Append `operations` as a new content stream after the page's existing
/// content.
pub fn append_content(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
    let encoded = Content { operations }
        .encode()
        .map_err(|err| FormwerkError::PdfError(format!("failed to encode content: {err}")))?;
    let stream_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), encoded)));

    let page = page_dictionary(doc, page_id)?;
    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(existing)) => Object::Array(vec![
            Object::Reference(*existing),
            Object::Reference(stream_id),
        ]),
        Ok(Object::Array(existing)) => {
            let mut items = existing.clone();
            items.push(Object::Reference(stream_id));
            Object::Array(items)
        }
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", contents);
    Ok(())
}

/// Operations drawing `operand` in black at `(x, y)` with a font resource.
pub fn text_operations(font_name: &str, font_size: f32, x: f32, y: f32, operand: Object) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font_name.as_bytes().to_vec()), real(font_size)],
        ),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new("Tj", vec![operand]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Operations painting an image XObject with its lower-left corner at
/// `(x, y)`, `width` x `height` points, rotated counter-clockwise by
/// `rotation` degrees about that corner.
pub fn image_operations(
    image_name: &str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    rotation: f32,
) -> Vec<Operation> {
    let radians = rotation.rem_euclid(360.0).to_radians();
    let (sin, cos) = radians.sin_cos();
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![real(cos), real(sin), real(-sin), real(cos), real(x), real(y)],
        ),
        Operation::new(
            "cm",
            vec![real(width), real(0.0), real(0.0), real(height), real(0.0), real(0.0)],
        ),
        Operation::new("Do", vec![Object::Name(image_name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// A raster written into the document as an image XObject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub object_id: ObjectId,
    /// Pixel dimensions, drawn one point per pixel at scale 100.
    pub width: u32,
    pub height: u32,
}

/// Write `image` as an RGB image XObject, with a soft mask when any pixel
/// is not fully opaque.
pub fn embed_raster(doc: &mut Document, image: &RgbaImage) -> Result<EmbeddedImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(FormwerkError::ImageError("image has no pixels".to_string()));
    }

    let pixels = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in image.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut xobject = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if alpha.iter().any(|&a| a < u8::MAX) {
        let mask = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        };
        let mask_id = doc.add_object(Object::Stream(Stream::new(mask, alpha)));
        xobject.set("SMask", Object::Reference(mask_id));
    }

    let object_id = doc.add_object(Object::Stream(Stream::new(xobject, rgb)));
    debug!(width, height, ?object_id, "Raster embedded");
    Ok(EmbeddedImage {
        object_id,
        width,
        height,
    })
}

/// Rounded real operand. Keeps content streams stable and free of `-0`.
fn real(value: f32) -> Object {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    Object::Real(if rounded == 0.0 { 0.0 } else { rounded })
}

fn page_dictionary(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => Ok(page),
        _ => Err(FormwerkError::PdfError(format!(
            "page {page_id:?} is not a dictionary"
        ))),
    }
}

/// The resources a page's content sees, as an owned dictionary.
fn effective_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    const MAX_DEPTH: usize = 32;

    let mut current = page_id;
    for _ in 0..MAX_DEPTH {
        let node = match doc.get_object(current) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => {
                return Err(FormwerkError::PdfError(format!(
                    "page tree node {current:?} is not a dictionary"
                )));
            }
        };
        match node.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => return Ok(dict.clone()),
            Ok(Object::Reference(id)) => {
                return match doc.get_object(*id) {
                    Ok(Object::Dictionary(dict)) => Ok(dict.clone()),
                    _ => Ok(Dictionary::new()),
                };
            }
            _ => {}
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => break,
        }
    }
    Ok(Dictionary::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::blank_document;
    use image::Rgba;

    fn first_page(doc: &Document) -> ObjectId {
        doc.get_pages().into_values().next().unwrap()
    }

    #[test]
    fn inherited_resources_are_copied_not_shared() {
        let mut doc = blank_document(2);
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let font_id = doc.add_object(Object::Dictionary(Dictionary::new()));

        register_resource(&mut doc, pages[0], ResourceCategory::Font, "FwF9", font_id).unwrap();

        let page = doc.get_dictionary(pages[0]).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"FwF9"));
        // The existing font entry survives.
        assert!(fonts.has(b"F1"));

        let other = doc.get_dictionary(pages[1]).unwrap();
        assert!(other.get(b"Resources").is_err());
    }

    #[test]
    fn appended_content_follows_existing() {
        let mut doc = blank_document(1);
        let page = first_page(&doc);
        let before = doc.get_page_contents(page).len();

        append_content(&mut doc, page, vec![Operation::new("q", vec![]), Operation::new("Q", vec![])])
            .unwrap();

        let contents = doc.get_page_contents(page);
        assert_eq!(contents.len(), before + 1);
        let content = doc.get_page_content(page).unwrap();
        let decoded = Content::decode(&content).unwrap();
        assert_eq!(decoded.operations.last().unwrap().operator, "Q");
    }

    #[test]
    fn text_run_shape() {
        let ops = text_operations("FwF3", 12.0, 50.0, 700.0, Object::string_literal("Ada"));
        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, ["q", "rg", "BT", "Tf", "Td", "Tj", "ET", "Q"]);
        assert_eq!(ops[4].operands[0].as_float().unwrap(), 50.0);
        assert_eq!(ops[4].operands[1].as_float().unwrap(), 700.0);
    }

    #[test]
    fn quarter_turn_matrix() {
        let ops = image_operations("FwIm4", 10.0, 20.0, 100.0, 50.0, 90.0);
        let rotate: Vec<f32> = ops[1].operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(rotate, [0.0, 1.0, -1.0, 0.0, 10.0, 20.0]);
        let scale: Vec<f32> = ops[2].operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(scale, [100.0, 0.0, 0.0, 50.0, 0.0, 0.0]);
    }

    #[test]
    fn opaque_raster_has_no_mask() {
        let mut doc = Document::with_version("1.7");
        let opaque = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let embedded = embed_raster(&mut doc, &opaque).unwrap();
        assert_eq!((embedded.width, embedded.height), (4, 2));

        let stream = doc.get_object(embedded.object_id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_err());
        assert_eq!(stream.content.len(), 4 * 2 * 3);
    }

    #[test]
    fn translucent_raster_gets_mask() {
        let mut doc = Document::with_version("1.7");
        let translucent = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 128]));
        let embedded = embed_raster(&mut doc, &translucent).unwrap();
        let stream = doc.get_object(embedded.object_id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_ok());
    }

    #[test]
    fn empty_raster_rejected() {
        let mut doc = Document::with_version("1.7");
        assert!(embed_raster(&mut doc, &RgbaImage::new(0, 0)).is_err());
    }
}
