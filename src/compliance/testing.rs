//! Helpers shared by the unit tests of the compliance modules.

use super::types::ErrorCode;
use crate::document::PdfDocument;
use crate::error::Result;
use crate::object::{Dictionary, Object, ObjectRef};

pub(crate) fn dict(entries: Vec<(&str, Object)>) -> Dictionary {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub(crate) fn dict_obj(entries: Vec<(&str, Object)>) -> Object {
    Object::Dictionary(dict(entries))
}

pub(crate) fn code_of<T>(result: Result<T>) -> Option<ErrorCode> {
    result.err().and_then(|e| e.as_conformance().map(|c| c.code))
}

/// A document whose catalog (object 1) holds `entries` and whose trailer
/// carries an ID.
pub(crate) fn document_with_catalog(entries: Vec<(&str, Object)>) -> PdfDocument {
    let mut doc = PdfDocument::new((1, 4));
    let root = ObjectRef::new(1, 0);
    let mut catalog = dict(vec![("Type", Object::name("Catalog"))]);
    catalog.extend(dict(entries));
    doc.set_object(root, Object::Dictionary(catalog));
    doc.trailer_mut().insert("Root".to_string(), Object::Reference(root));
    doc.trailer_mut().insert(
        "ID".to_string(),
        Object::Array(vec![Object::string("0123"), Object::string("0123")]),
    );
    doc
}

/// A one-page document: catalog 1, page tree 2, page 3 with a letter-size
/// `MediaBox` plus `page_entries`.
pub(crate) fn document_with_page(catalog_entries: Vec<(&str, Object)>, page_entries: Vec<(&str, Object)>) -> PdfDocument {
    let pages_ref = ObjectRef::new(2, 0);
    let page_ref = ObjectRef::new(3, 0);
    let mut entries = vec![("Pages", Object::Reference(pages_ref))];
    entries.extend(catalog_entries);
    let mut doc = document_with_catalog(entries);

    doc.set_object(
        pages_ref,
        dict_obj(vec![
            ("Type", Object::name("Pages")),
            ("Kids", Object::Array(vec![Object::Reference(page_ref)])),
            ("Count", Object::Integer(1)),
        ]),
    );
    let mut page = dict(vec![
        ("Type", Object::name("Page")),
        ("Parent", Object::Reference(pages_ref)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
    ]);
    page.extend(dict(page_entries));
    doc.set_object(page_ref, Object::Dictionary(page));
    doc
}
