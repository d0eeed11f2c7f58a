//! Content stream operations.
//!
//! Operations are kept close to the source: the operator keyword plus its raw
//! operand objects. The checker needs every operand as an object (to apply
//! numeric and string limits), so nothing is converted to typed fields.

use crate::object::{Dictionary, Object};
use lazy_static::lazy_static;
use std::collections::HashSet;

/// One operation of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOperation {
    /// An operator with the operands that preceded it
    Operator {
        /// Operator keyword (e.g. `re`, `RG`, `T*`)
        name: String,
        /// Operands in stream order
        operands: Vec<Object>,
        /// Byte offset of the operator keyword
        offset: usize,
    },
    /// Inline image (`BI ... ID ... EI`)
    InlineImage {
        /// Image dictionary, keys possibly abbreviated
        dict: Dictionary,
        /// Raw image data between `ID` and `EI`
        data: Vec<u8>,
        /// Byte offset of `BI`
        offset: usize,
    },
}

impl ContentOperation {
    /// Operator keyword; `BI` for inline images.
    pub fn operator(&self) -> &str {
        match self {
            ContentOperation::Operator { name, .. } => name,
            ContentOperation::InlineImage { .. } => "BI",
        }
    }

    /// Operands of the operation (empty for inline images).
    pub fn operands(&self) -> &[Object] {
        match self {
            ContentOperation::Operator { operands, .. } => operands,
            ContentOperation::InlineImage { .. } => &[],
        }
    }

    /// Byte offset of the operation in the decoded stream.
    pub fn offset(&self) -> usize {
        match self {
            ContentOperation::Operator { offset, .. } | ContentOperation::InlineImage { offset, .. } => *offset,
        }
    }
}

lazy_static! {
    /// Operators defined by ISO 32000-1:2008, Annex A.
    static ref KNOWN_OPERATORS: HashSet<&'static str> = [
        // General graphics state
        "w", "J", "j", "M", "d", "ri", "i", "gs",
        // Special graphics state
        "q", "Q", "cm",
        // Path construction and painting
        "m", "l", "c", "v", "y", "h", "re",
        "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "n",
        // Clipping
        "W", "W*",
        // Text objects, state, positioning and showing
        "BT", "ET", "Tc", "Tw", "Tz", "TL", "Tf", "Tr", "Ts",
        "Td", "TD", "Tm", "T*", "Tj", "TJ", "'", "\"",
        // Type 3 fonts
        "d0", "d1",
        // Color
        "CS", "cs", "SC", "SCN", "sc", "scn", "G", "g", "RG", "rg", "K", "k",
        // Shading, XObjects, inline images
        "sh", "Do", "BI", "ID", "EI",
        // Marked content
        "MP", "DP", "BMC", "BDC", "EMC",
        // Compatibility
        "BX", "EX",
    ]
    .into_iter()
    .collect();
}

/// Whether `name` is an operator defined by the PDF reference.
pub fn is_known_operator(name: &str) -> bool {
    KNOWN_OPERATORS.contains(name)
}
