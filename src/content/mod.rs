//! PDF content stream parsing.
//!
//! Content streams hold the sequences of operators that paint a page, a form
//! XObject, a tiling pattern or a Type 3 glyph.

pub mod operators;
pub mod parser;

pub use operators::{is_known_operator, ContentOperation};
pub use parser::parse_content_stream;
