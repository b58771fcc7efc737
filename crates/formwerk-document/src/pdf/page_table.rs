// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page table — logical page index to concrete page object, appending blank
// pages on demand.

use std::collections::HashSet;

use formwerk_core::error::{FormwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

/// Maps zero-based page indices to pages of the output document.
///
/// Page count only grows. An index at or past the end appends exactly one
/// page, however far past the end it is.
pub struct PageTable {
    page_ids: Vec<ObjectId>,
    pages_root: ObjectId,
    /// Size of appended pages in points.
    appended_size: (f32, f32),
    /// Pages whose original content has been wrapped in `q`/`Q`.
    isolated: HashSet<ObjectId>,
}

impl PageTable {
    pub fn new(doc: &Document, appended_size: (f32, f32)) -> Result<Self> {
        let pages_root = doc
            .catalog()
            .map_err(|err| FormwerkError::PdfError(format!("no catalog: {err}")))
            .and_then(|catalog| match catalog.get(b"Pages") {
                Ok(Object::Reference(id)) => Ok(*id),
                Ok(_) => Err(FormwerkError::PdfError(
                    "/Pages is not a reference".to_string(),
                )),
                Err(err) => Err(FormwerkError::PdfError(format!("no /Pages: {err}"))),
            })?;

        // get_pages is keyed by 1-based page number, already in order.
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        debug!(pages = page_ids.len(), "Page table built");

        Ok(Self {
            page_ids,
            pages_root,
            appended_size,
            isolated: HashSet::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// The page for `index`, appending one blank page if `index` is past
    /// the end.
    pub fn page_for(&mut self, doc: &mut Document, index: u32) -> Result<ObjectId> {
        if let Some(id) = self.page_ids.get(index as usize) {
            return Ok(*id);
        }
        let id = self.append_page(doc)?;
        info!(
            requested = index,
            appended_as = self.page_ids.len() - 1,
            "Appended blank page"
        );
        Ok(id)
    }

    fn append_page(&mut self, doc: &mut Document) -> Result<ObjectId> {
        let (width, height) = self.appended_size;

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_root));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ]),
        );
        page.set("Resources", Object::Dictionary(Dictionary::new()));
        let page_id = doc.add_object(Object::Dictionary(page));

        let count = self.page_ids.len() as i64 + 1;
        match doc.get_object_mut(self.pages_root) {
            Ok(Object::Dictionary(pages_dict)) => {
                match pages_dict.get_mut(b"Kids") {
                    Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
                    _ => pages_dict.set("Kids", Object::Array(vec![Object::Reference(page_id)])),
                }
                pages_dict.set("Count", Object::Integer(count));
            }
            _ => {
                return Err(FormwerkError::PdfError(
                    "page tree root is not a dictionary".to_string(),
                ));
            }
        }

        self.page_ids.push(page_id);
        // A fresh page has no content to isolate.
        self.isolated.insert(page_id);
        Ok(page_id)
    }

    /// Wrap the page's existing content in `q`/`Q` once, so overlays start
    /// from the default graphics state.
    pub fn isolate_existing_content(&mut self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        if !self.isolated.insert(page_id) {
            return Ok(());
        }

        let existing = doc.get_page_contents(page_id);
        if existing.is_empty() {
            return Ok(());
        }

        let open = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), b"q\n".to_vec())));
        let close = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), b"\nQ\n".to_vec())));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open));
        contents.extend(existing.into_iter().map(Object::Reference));
        contents.push(Object::Reference(close));

        match doc.get_object_mut(page_id) {
            Ok(Object::Dictionary(page)) => {
                page.set("Contents", Object::Array(contents));
                Ok(())
            }
            _ => Err(FormwerkError::PdfError(format!(
                "page {page_id:?} is not a dictionary"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::blank_document;

    const LETTER: (f32, f32) = (612.0, 792.0);

    #[test]
    fn existing_pages_are_returned() {
        let mut doc = blank_document(2);
        let mut table = PageTable::new(&doc, LETTER).unwrap();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        assert_eq!(table.page_for(&mut doc, 0).unwrap(), pages[0]);
        assert_eq!(table.page_for(&mut doc, 1).unwrap(), pages[1]);
        assert_eq!(table.page_count(), 2);
    }

    #[test]
    fn far_index_appends_exactly_one_page() {
        let mut doc = blank_document(1);
        let mut table = PageTable::new(&doc, LETTER).unwrap();

        let appended = table.page_for(&mut doc, 7).unwrap();
        assert_eq!(table.page_count(), 2);
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(doc.get_pages().get(&2), Some(&appended));

        // The appended page now answers to index 1, not 7.
        assert_eq!(table.page_for(&mut doc, 1).unwrap(), appended);
        let another = table.page_for(&mut doc, 7).unwrap();
        assert_ne!(another, appended);
        assert_eq!(table.page_count(), 3);
    }

    #[test]
    fn empty_document_grows_from_zero() {
        let mut doc = blank_document(0);
        let mut table = PageTable::new(&doc, LETTER).unwrap();
        table.page_for(&mut doc, 0).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn isolation_wraps_once() {
        let mut doc = blank_document(1);
        let mut table = PageTable::new(&doc, LETTER).unwrap();
        let page = table.page_for(&mut doc, 0).unwrap();

        table.isolate_existing_content(&mut doc, page).unwrap();
        let after_first = doc.get_page_contents(page).len();
        table.isolate_existing_content(&mut doc, page).unwrap();
        assert_eq!(doc.get_page_contents(page).len(), after_first);
        assert_eq!(after_first, 3);
    }
}
