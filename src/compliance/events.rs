//! Validation events.
//!
//! Every check the core performs is reachable through one closed set of
//! events, so adding a new event kind without handling it fails to compile.

use crate::document::Page;
use crate::object::{Dictionary, Object, ObjectRef};

/// Graphics state stack operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasOp {
    /// `q`
    Save,
    /// `Q`
    Restore,
}

/// Something the checker can be asked to validate.
#[derive(Debug, Clone, Copy)]
pub enum ValidationEvent<'a> {
    /// The whole document
    Document,
    /// One page, including its resources, annotations and content
    Page(&'a Page<'a>),
    /// A content stream with the resources it is painted with
    ContentStreamObject {
        /// The stream (or a reference to it)
        stream: &'a Object,
        /// Resources in effect
        resources: Option<&'a Dictionary>,
    },
    /// A fill color operator
    FillColor {
        /// Operator keyword
        operator: &'a str,
        /// Operands of the operator
        operands: &'a [Object],
        /// Resources in effect
        resources: Option<&'a Dictionary>,
    },
    /// A stroke color operator
    StrokeColor {
        /// Operator keyword
        operator: &'a str,
        /// Operands of the operator
        operands: &'a [Object],
        /// Resources in effect
        resources: Option<&'a Dictionary>,
    },
    /// A graphics state parameter dictionary (or a reference to it)
    ExtGState(&'a Object),
    /// An inline image
    InlineImage {
        /// Image dictionary (keys possibly abbreviated)
        dict: &'a Dictionary,
        /// Raw image data
        data: &'a [u8],
        /// Resources in effect
        resources: Option<&'a Dictionary>,
    },
    /// A rendering intent name
    RenderingIntent(&'a str),
    /// Character codes shown with a font
    FontGlyphs {
        /// Font dictionary
        font: &'a Dictionary,
        /// Raw string bytes
        codes: &'a [u8],
    },
    /// The cross-reference table (object count and every indirect object)
    XrefTable,
    /// A signature dictionary
    Signature(&'a Dictionary),
    /// A signature SubFilter
    SignatureType(&'a str),
    /// An encryption dictionary
    Crypto(&'a Dictionary),
    /// A text-showing operator with the selected font
    Text {
        /// Font selected with `Tf`, if any
        font: Option<&'a Dictionary>,
    },
    /// `q` or `Q`
    CanvasStack(CanvasOp),
    /// The entries of a page dictionary
    PageObject {
        /// Page reference
        page_ref: ObjectRef,
        /// Page dictionary
        dict: &'a Dictionary,
    },
    /// Any object, generic limits only
    PdfObject(&'a Object),
}

impl ValidationEvent<'_> {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationEvent::Document => "Document",
            ValidationEvent::Page(_) => "Page",
            ValidationEvent::ContentStreamObject { .. } => "ContentStreamObject",
            ValidationEvent::FillColor { .. } => "FillColor",
            ValidationEvent::StrokeColor { .. } => "StrokeColor",
            ValidationEvent::ExtGState(_) => "ExtGState",
            ValidationEvent::InlineImage { .. } => "InlineImage",
            ValidationEvent::RenderingIntent(_) => "RenderingIntent",
            ValidationEvent::FontGlyphs { .. } => "FontGlyphs",
            ValidationEvent::XrefTable => "XrefTable",
            ValidationEvent::Signature(_) => "Signature",
            ValidationEvent::SignatureType(_) => "SignatureType",
            ValidationEvent::Crypto(_) => "Crypto",
            ValidationEvent::Text { .. } => "Text",
            ValidationEvent::CanvasStack(_) => "CanvasStack",
            ValidationEvent::PageObject { .. } => "PageObject",
            ValidationEvent::PdfObject(_) => "PdfObject",
        }
    }
}
