//! PDF/A conformance checking.
//!
//! One checker core, [`PdfAChecker`], walks the object graph and the content
//! streams of a document and stops at the first rule violation. Everything
//! that differs between PDF/A parts and sub-levels is data in a
//! [`ConformancePolicy`]; the checker itself never branches on the level.
//!
//! ## PDF/A Conformance Levels (Archival)
//!
//! - **PDF/A-1b**: Basic conformance, visual appearance preservation
//! - **PDF/A-1a**: Full conformance, includes logical structure (Tagged PDF)
//! - **PDF/A-2b**: Based on PDF 1.7, allows JPEG2000, transparency
//! - **PDF/A-2a**: PDF/A-2b plus logical structure
//! - **PDF/A-2u**: PDF/A-2b plus Unicode mapping
//! - **PDF/A-3b**: PDF/A-2b plus embedded files of any type
//! - **PDF/A-3a**: PDF/A-3b plus logical structure
//! - **PDF/A-3u**: PDF/A-3b plus Unicode mapping
//! - **PDF/A-4**: Based on PDF 2.0, implementation limits lifted
//! - **PDF/A-4e**: PDF/A-4 for engineering documents (3D, RichMedia)
//! - **PDF/A-4f**: PDF/A-4 with embedded files
//!
//! ## Example
//!
//! ```
//! use pdfa_oxide::compliance::{validate_pdf_a, PdfALevel};
//! use pdfa_oxide::document::PdfDocument;
//! use pdfa_oxide::object::{Object, ObjectRef};
//!
//! let mut doc = PdfDocument::new((1, 4));
//! let root = doc.add_object(Object::Dictionary(Default::default()));
//! doc.trailer_mut().insert("Root".to_string(), Object::Reference(root));
//!
//! let result = validate_pdf_a(&doc, PdfALevel::A1b).unwrap();
//! assert!(!result.is_compliant);
//! println!("{}", result.error.unwrap());
//! ```
//!
//! ## Standards Reference
//!
//! - ISO 19005-1:2005 (PDF/A-1)
//! - ISO 19005-2:2011 (PDF/A-2)
//! - ISO 19005-3:2012 (PDF/A-3)
//! - ISO 19005-4:2020 (PDF/A-4)

mod annotations;
mod catalog;
mod checker;
mod color;
mod colorspaces;
mod content;
mod events;
mod fonts;
mod graphics;
mod icc;
mod jpx;
mod metadata;
mod objects;
mod pages;
mod pdf_a;
mod policy;
mod resources;
mod session;
mod types;

#[cfg(test)]
mod testing;

pub use annotations::AnnotationFlags;
pub use checker::PdfAChecker;
pub use color::{ColorSpaceFamily, ColorUsage, OutputIntentColor, SeparationRegistry, UsageKinds, UsageTracker};
pub use colorspaces::{read_output_intent, PDFA_OUTPUT_INTENT};
pub use events::{CanvasOp, ValidationEvent};
pub use fonts::FontFlags;
pub use graphics::RENDERING_INTENTS;
pub use icc::IccHeader;
pub use metadata::{read_identification, PdfaIdentification};
pub use pdf_a::{validate_pdf_a, PdfAValidator};
pub use policy::{ConformancePolicy, FileSpecRule, NumericLimits, TransparencyRule, TrueTypeEncodingRule};
pub use resources::expand_filter_name;
pub use session::{BlendingSpace, CheckedObjects, OutputIntent, ValidationSession};
pub use types::{
    ComplianceWarning, ConformanceError, ErrorCode, PdfALevel, PdfAPart, ValidationResult, ValidationStats,
    WarningCode,
};
