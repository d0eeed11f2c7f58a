//! Font checks: embedding, TrueType encodings, CID maps, Unicode mapping and
//! glyph coverage.
//!
//! See ISO 19005-1, 6.3 and ISO 19005-2, 6.2.11.

use super::checker::{fail, PdfAChecker};
use super::policy::TrueTypeEncodingRule;
use super::session::ValidationSession;
use super::types::{ConformanceError, ErrorCode};
use crate::error::Result;
use crate::object::{dict_name, Dictionary, Object};
use bitflags::bitflags;

bitflags! {
    /// Font descriptor flags.
    ///
    /// Per ISO 32000-1:2008 Table 123 (Font flags).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontFlags: u32 {
        /// Bit 1: All glyphs have the same width
        const FIXED_PITCH = 1 << 0;
        /// Bit 2: Glyphs have serifs
        const SERIF = 1 << 1;
        /// Bit 3: Font contains glyphs outside the standard Latin set
        const SYMBOLIC = 1 << 2;
        /// Bit 4: Glyphs resemble cursive handwriting
        const SCRIPT = 1 << 3;
        /// Bit 6: Font uses the standard Latin character set
        const NONSYMBOLIC = 1 << 5;
        /// Bit 7: Glyphs have dominant vertical strokes that are slanted
        const ITALIC = 1 << 6;
        /// Bit 17: No lowercase letters
        const ALL_CAP = 1 << 16;
        /// Bit 18: Lowercase letters are small capitals
        const SMALL_CAP = 1 << 17;
        /// Bit 19: Bold glyphs at small sizes
        const FORCE_BOLD = 1 << 18;
    }
}

/// Encodings a non-symbolic TrueType font may use.
const TRUETYPE_ENCODINGS: [&str; 2] = ["MacRomanEncoding", "WinAnsiEncoding"];

/// Encodings whose glyph names map to Unicode without a `ToUnicode` CMap.
const UNICODE_ENCODINGS: [&str; 4] = [
    "MacRomanEncoding",
    "WinAnsiEncoding",
    "StandardEncoding",
    "MacExpertEncoding",
];

/// Keys of a font descriptor that hold an embedded font program.
const FONT_FILE_KEYS: [&str; 3] = ["FontFile", "FontFile2", "FontFile3"];

fn font_name(font: &Dictionary) -> &str {
    dict_name(font, "BaseFont").unwrap_or("(unnamed)")
}

/// The named encoding of a font: the `Encoding` name, or the
/// `BaseEncoding` of an encoding dictionary.
fn named_encoding<'a>(session: &ValidationSession<'a>, font: &'a Dictionary) -> Result<Option<&'a str>> {
    let doc = session.document();
    Ok(match doc.get(font, "Encoding")? {
        Some(Object::Name(name)) => Some(name.as_str()),
        Some(Object::Dictionary(encoding)) => dict_name(encoding, "BaseEncoding"),
        _ => None,
    })
}

impl PdfAChecker {
    /// A font dictionary (or a reference to one).
    pub(crate) fn check_font(&self, session: &mut ValidationSession<'_>, font: &Object) -> Result<()> {
        let node = font.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = match session.document().resolve_dict(font) {
            Ok(Some(dict)) => self.check_font_dict(session, dict),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        session.end_node(node);
        result
    }

    fn check_font_dict(&self, session: &mut ValidationSession<'_>, font: &Dictionary) -> Result<()> {
        let doc = session.document();
        session.stats.fonts_checked += 1;

        match dict_name(font, "Subtype") {
            Some("Type3") => self.check_type3_font(session, font),
            Some("Type0") => {
                let descendant = match doc.get(font, "DescendantFonts")? {
                    Some(Object::Array(items)) => match items.first() {
                        Some(first) => doc.resolve_dict(first)?,
                        None => None,
                    },
                    _ => None,
                };
                match descendant {
                    Some(descendant) => self.check_cid_font(session, descendant),
                    None => fail(ConformanceError::new(ErrorCode::MissingFontDescriptor).with_param(font_name(font))),
                }
            },
            Some("CIDFontType0") | Some("CIDFontType2") => self.check_cid_font(session, font),
            Some("TrueType") => {
                let descriptor = self.check_embedded(session, font)?;
                self.check_truetype_encoding(session, font, descriptor)
            },
            _ => self.check_embedded(session, font).map(|_| ()),
        }
    }

    /// The font descriptor must exist and carry a font program.
    fn check_embedded<'a>(&self, session: &ValidationSession<'a>, font: &'a Dictionary) -> Result<&'a Dictionary> {
        let doc = session.document();
        let descriptor = match doc.get(font, "FontDescriptor")?.and_then(Object::as_dict) {
            Some(descriptor) => descriptor,
            None => {
                return fail(
                    ConformanceError::new(ErrorCode::MissingFontDescriptor)
                        .with_param(font_name(font))
                        .with_clause(self.clause("6.3.3", "6.2.11.2")),
                )
            },
        };
        if !FONT_FILE_KEYS.iter().any(|key| descriptor.contains_key(*key)) {
            return fail(
                ConformanceError::new(ErrorCode::FontNotEmbedded)
                    .with_param(font_name(font))
                    .with_clause(self.clause("6.3.4", "6.2.11.4.1")),
            );
        }
        Ok(descriptor)
    }

    fn check_cid_font(&self, session: &mut ValidationSession<'_>, font: &Dictionary) -> Result<()> {
        self.check_embedded(session, font)?;
        if dict_name(font, "Subtype") == Some("CIDFontType2") && !font.contains_key("CIDToGIDMap") {
            return fail(
                ConformanceError::new(ErrorCode::MissingCidToGidMap)
                    .with_param(font_name(font))
                    .with_clause(self.clause("6.3.3.2", "6.2.11.3.2")),
            );
        }
        Ok(())
    }

    fn check_truetype_encoding(
        &self,
        session: &ValidationSession<'_>,
        font: &Dictionary,
        descriptor: &Dictionary,
    ) -> Result<()> {
        let doc = session.document();
        let flags = doc
            .get(descriptor, "Flags")?
            .and_then(Object::as_integer)
            .map(|bits| FontFlags::from_bits_truncate(bits as u32))
            .unwrap_or(FontFlags::empty());
        let has_encoding = font.contains_key("Encoding");

        if flags.contains(FontFlags::SYMBOLIC) {
            if self.policy().symbolic_truetype_forbids_encoding && has_encoding {
                return fail(
                    ConformanceError::new(ErrorCode::SymbolicFontWithEncoding)
                        .with_param(font_name(font))
                        .with_clause(self.clause("6.3.7", "6.2.11.6")),
                );
            }
            return Ok(());
        }

        let standard = named_encoding(session, font)?.is_some_and(|name| TRUETYPE_ENCODINGS.contains(&name));
        let allowed = standard
            || (!has_encoding && self.policy().truetype_encoding == TrueTypeEncodingRule::StandardOrAbsent);
        if !allowed {
            return fail(
                ConformanceError::new(ErrorCode::FontInvalidEncoding)
                    .with_param(font_name(font))
                    .with_clause(self.clause("6.3.7", "6.2.11.6")),
            );
        }
        Ok(())
    }

    /// Glyph procedures of a Type 3 font are content streams.
    fn check_type3_font(&self, session: &mut ValidationSession<'_>, font: &Dictionary) -> Result<()> {
        let doc = session.document();
        let resources = match font.get("Resources") {
            Some(res) => doc.resolve_dict(res)?,
            None => None,
        };
        let procs = match doc.get(font, "CharProcs")?.and_then(Object::as_dict) {
            Some(procs) => procs,
            None => return Ok(()),
        };

        session.descend()?;
        let result = self.check_resources(session, resources).and_then(|_| {
            for glyph in procs.values() {
                self.walk_content_stream(session, glyph, resources)?;
            }
            Ok(())
        });
        session.ascend();
        result
    }

    /// Text shown with the font selected by `Tf`.
    pub(crate) fn check_text(&self, session: &ValidationSession<'_>, font: Option<&Dictionary>) -> Result<()> {
        let font = match font {
            Some(font) => font,
            None => {
                return fail(
                    ConformanceError::new(ErrorCode::TextWithoutFont).at_location(session.location()),
                )
            },
        };
        if !self.policy().require_unicode {
            return Ok(());
        }
        let doc = session.document();
        let has_to_unicode = font.contains_key("ToUnicode");
        let standard = match doc.get(font, "Encoding")? {
            Some(Object::Name(name)) => UNICODE_ENCODINGS.contains(&name.as_str()),
            Some(Object::Dictionary(encoding)) => {
                dict_name(encoding, "BaseEncoding").is_some_and(|name| UNICODE_ENCODINGS.contains(&name))
            },
            _ => false,
        };
        if !has_to_unicode && !standard {
            return fail(
                ConformanceError::new(ErrorCode::FontMissingToUnicode)
                    .with_param(font_name(font))
                    .with_clause(self.clause("6.3.8", "6.2.11.7.2")),
            );
        }
        Ok(())
    }

    /// Every shown code of a simple font must have a width.
    pub(crate) fn check_glyphs(&self, session: &ValidationSession<'_>, font: &Dictionary, codes: &[u8]) -> Result<()> {
        if dict_name(font, "Subtype") == Some("Type0") {
            return Ok(());
        }
        let doc = session.document();
        let first = doc.get(font, "FirstChar")?.and_then(Object::as_integer);
        let last = doc.get(font, "LastChar")?.and_then(Object::as_integer);
        let widths = doc.get(font, "Widths")?.and_then(Object::as_array);
        let (first, last, widths) = match (first, last, widths) {
            (Some(first), Some(last), Some(widths)) => (first, last, widths),
            _ => return Ok(()),
        };

        for &code in codes {
            let code = i64::from(code);
            let defined = code >= first && code <= last && widths.get((code - first) as usize).is_some();
            if !defined {
                return fail(
                    ConformanceError::new(ErrorCode::GlyphOutOfRange)
                        .with_param(code)
                        .with_param(font_name(font))
                        .with_clause(self.clause("6.3.5", "6.2.11.4.1")),
                );
            }
        }
        Ok(())
    }
}
