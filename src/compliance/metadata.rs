//! XMP metadata checks.
//!
//! The catalog `Metadata` stream must hold a well-formed XMP packet with the
//! PDF/A identification schema (`pdfaid`). Properties may be written as
//! elements or as attributes of `rdf:Description`; both forms are read.
//! See ISO 19005-1, 6.7 and ISO 19005-2, 6.6.

use super::checker::{fail, PdfAChecker};
use super::session::ValidationSession;
use super::types::{ConformanceError, ErrorCode, PdfALevel};
use crate::error::Result;
use crate::object::{dict_name, Dictionary, Object};
use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

lazy_static! {
    static ref REV_PATTERN: Regex = Regex::new(r"^[0-9]{4}$").expect("valid regex");
}

/// PDF/A identification read from an XMP packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfaIdentification {
    /// `pdfaid:part`
    pub part: Option<String>,
    /// `pdfaid:conformance`
    pub conformance: Option<String>,
    /// `pdfaid:rev`
    pub rev: Option<String>,
    /// Whether `xmpMM:History` is present
    pub has_history: bool,
}

impl PdfaIdentification {
    /// Level named by part and conformance, if it is a known one.
    pub fn level(&self) -> Option<PdfALevel> {
        let part = self.part.as_deref()?;
        PdfALevel::from_xmp(part, self.conformance.as_deref())
    }

    fn set(&mut self, property: &str, value: &str) {
        let value = value.trim();
        match property {
            "pdfaid:part" => self.part = Some(value.to_string()),
            "pdfaid:conformance" => self.conformance = Some(value.to_string()),
            "pdfaid:rev" => self.rev = Some(value.to_string()),
            "xmpMM:History" => self.has_history = true,
            _ => {},
        }
    }

    fn read_attributes(&mut self, element: &BytesStart<'_>) -> std::result::Result<(), String> {
        for attr in element.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            self.set(&key, &value);
        }
        Ok(())
    }
}

/// Parse an XMP packet and read its PDF/A identification.
///
/// Fails with a description when the packet is not well-formed XML.
pub fn read_identification(xml: &str) -> std::result::Result<PdfaIdentification, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut id = PdfaIdentification::default();
    let mut element_stack: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "xmpMM:History" {
                    id.has_history = true;
                }
                id.read_attributes(&e)?;
                element_stack.push(name);
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"xmpMM:History" {
                    id.has_history = true;
                }
                id.read_attributes(&e)?;
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                if let Some(property) = element_stack.last() {
                    id.set(property, &text);
                }
            },
            Ok(Event::End(_)) => {
                element_stack.pop();
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("at byte {}: {}", reader.buffer_position(), e)),
            _ => {},
        }
    }

    if let Some(open) = element_stack.last() {
        return Err(format!("element {} is not closed", open));
    }
    Ok(id)
}

impl PdfAChecker {
    /// Metadata stream, XMP well-formedness and PDF/A identification.
    pub(crate) fn check_metadata(&self, session: &mut ValidationSession<'_>, catalog: &Dictionary) -> Result<()> {
        let doc = session.document();
        let clause = self.clause("6.7.2", "6.6.2.1");

        let stream = match catalog.get("Metadata") {
            Some(obj) => doc.resolve(obj)?,
            None => return fail(ConformanceError::new(ErrorCode::MissingXmpMetadata).with_clause(clause)),
        };
        let dict = match stream {
            Object::Stream { dict, .. } => dict,
            _ => {
                return fail(
                    ConformanceError::new(ErrorCode::InvalidMetadataStream)
                        .with_param("Metadata is not a stream")
                        .with_clause(clause),
                )
            },
        };
        if dict_name(dict, "Type") != Some("Metadata") || dict_name(dict, "Subtype") != Some("XML") {
            return fail(
                ConformanceError::new(ErrorCode::InvalidMetadataStream)
                    .with_param("Type shall be Metadata and Subtype shall be XML")
                    .with_clause(clause),
            );
        }
        if self.policy().forbid_metadata_filter && dict.contains_key("Filter") {
            return fail(
                ConformanceError::new(ErrorCode::InvalidMetadataStream)
                    .with_param("Filter key is not allowed")
                    .with_clause(clause),
            );
        }

        let data = stream.decode_stream_data()?;
        let xml = String::from_utf8_lossy(&data);
        let id = match read_identification(&xml) {
            Ok(id) => id,
            Err(reason) => {
                return fail(ConformanceError::new(ErrorCode::MalformedXmp).with_param(reason).with_clause(clause))
            },
        };
        session.detected_level = id.level();
        log::debug!("XMP identification: {:?}", id);

        self.check_identification(&id)
    }

    fn check_identification(&self, id: &PdfaIdentification) -> Result<()> {
        let level = self.level();
        let clause = self.clause("6.7.11", "6.6.4");

        let part = match id.part.as_deref() {
            Some(part) => part,
            None => return fail(ConformanceError::new(ErrorCode::MissingPdfaIdentification).with_clause(clause)),
        };
        if part != level.xmp_part() {
            return fail(
                ConformanceError::new(ErrorCode::InvalidPdfaIdentification)
                    .with_param("part")
                    .with_param(part)
                    .with_param(level)
                    .with_clause(clause),
            );
        }
        if id.conformance.as_deref() != level.xmp_conformance() {
            return fail(
                ConformanceError::new(ErrorCode::InvalidPdfaIdentification)
                    .with_param("conformance")
                    .with_param(id.conformance.as_deref().unwrap_or("(none)"))
                    .with_param(level)
                    .with_clause(clause),
            );
        }

        if self.policy().require_xmp_rev {
            match id.rev.as_deref() {
                None => return fail(ConformanceError::new(ErrorCode::MissingXmpProperty).with_param("pdfaid:rev")),
                Some(rev) if !REV_PATTERN.is_match(rev) => {
                    return fail(
                        ConformanceError::new(ErrorCode::InvalidXmpProperty)
                            .with_param("pdfaid:rev")
                            .with_param(rev),
                    )
                },
                Some(_) => {},
            }
        }
        if self.policy().require_xmp_history && !id.has_history {
            return fail(ConformanceError::new(ErrorCode::MissingXmpProperty).with_param("xmpMM:History"));
        }
        Ok(())
    }
}

/// Build an XMP packet carrying a PDF/A identification.
#[cfg(test)]
pub(crate) fn test_packet(part: &str, conformance: Option<&str>, extra: &str) -> String {
    let conformance = conformance
        .map(|c| format!("<pdfaid:conformance>{}</pdfaid:conformance>", c))
        .unwrap_or_default();
    format!(
        r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/" xmlns:xmpMM="http://ns.adobe.com/xap/1.0/mm/">
      <pdfaid:part>{}</pdfaid:part>
      {}
      {}
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
        part, conformance, extra
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::testing::{code_of, dict, document_with_catalog};
    use crate::document::PdfDocument;

    fn metadata_stream(xml: &str) -> Object {
        let dict = dict(vec![("Type", Object::name("Metadata")), ("Subtype", Object::name("XML"))]);
        Object::stream(dict, xml.as_bytes().to_vec())
    }

    fn check(level: PdfALevel, doc: &PdfDocument) -> Result<Option<PdfALevel>> {
        let checker = PdfAChecker::new(level);
        let mut session = checker.new_session(doc);
        checker.check_metadata(&mut session, doc.catalog()?)?;
        Ok(session.detected_level())
    }

    #[test]
    fn test_read_element_form() {
        let id = read_identification(&test_packet("2", Some("B"), "")).unwrap();
        assert_eq!(id.part.as_deref(), Some("2"));
        assert_eq!(id.conformance.as_deref(), Some("B"));
        assert_eq!(id.level(), Some(PdfALevel::A2b));
        assert!(!id.has_history);
    }

    #[test]
    fn test_read_attribute_form() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
            <rdf:Description rdf:about="" pdfaid:part="4" pdfaid:rev="2020"/>
        </rdf:RDF></x:xmpmeta>"#;
        let id = read_identification(xml).unwrap();
        assert_eq!(id.part.as_deref(), Some("4"));
        assert_eq!(id.rev.as_deref(), Some("2020"));
        assert_eq!(id.level(), Some(PdfALevel::A4));
    }

    #[test]
    fn test_malformed_packets() {
        assert!(read_identification("<a><b></a>").is_err());
        assert!(read_identification("<a><b></b>").unwrap_err().contains("not closed"));
    }

    #[test]
    fn test_missing_metadata() {
        let doc = document_with_catalog(vec![]);
        assert_eq!(code_of(check(PdfALevel::A1b, &doc)), Some(ErrorCode::MissingXmpMetadata));
    }

    #[test]
    fn test_identification_matches_level() {
        let doc = document_with_catalog(vec![("Metadata", metadata_stream(&test_packet("1", Some("B"), "")))]);
        assert_eq!(check(PdfALevel::A1b, &doc).unwrap(), Some(PdfALevel::A1b));
        assert_eq!(code_of(check(PdfALevel::A2b, &doc)), Some(ErrorCode::InvalidPdfaIdentification));
        assert_eq!(code_of(check(PdfALevel::A1a, &doc)), Some(ErrorCode::InvalidPdfaIdentification));
    }

    #[test]
    fn test_missing_identification() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"></x:xmpmeta>"#;
        let doc = document_with_catalog(vec![("Metadata", metadata_stream(xml))]);
        assert_eq!(code_of(check(PdfALevel::A2u, &doc)), Some(ErrorCode::MissingPdfaIdentification));
    }

    #[test]
    fn test_metadata_filter_in_part_one() {
        let mut stream_dict = dict(vec![("Type", Object::name("Metadata")), ("Subtype", Object::name("XML"))]);
        stream_dict.insert("Filter".to_string(), Object::name("ASCIIHexDecode"));
        let hex: String = test_packet("1", Some("B"), "").bytes().map(|b| format!("{:02X}", b)).collect();
        let doc = document_with_catalog(vec![("Metadata", Object::stream(stream_dict, format!("{}>", hex).into_bytes()))]);
        assert_eq!(code_of(check(PdfALevel::A1b, &doc)), Some(ErrorCode::InvalidMetadataStream));

        let mut stream_dict = dict(vec![("Type", Object::name("Metadata")), ("Subtype", Object::name("XML"))]);
        stream_dict.insert("Filter".to_string(), Object::name("ASCIIHexDecode"));
        let hex: String = test_packet("2", Some("B"), "").bytes().map(|b| format!("{:02X}", b)).collect();
        let doc = document_with_catalog(vec![("Metadata", Object::stream(stream_dict, format!("{}>", hex).into_bytes()))]);
        assert_eq!(check(PdfALevel::A2b, &doc).unwrap(), Some(PdfALevel::A2b));
    }

    #[test]
    fn test_part_four_rev_and_history() {
        let history = "<xmpMM:History><rdf:Seq/></xmpMM:History>";
        let good = test_packet("4", None, &format!("<pdfaid:rev>2020</pdfaid:rev>{}", history));
        let doc = document_with_catalog(vec![("Metadata", metadata_stream(&good))]);
        assert_eq!(check(PdfALevel::A4, &doc).unwrap(), Some(PdfALevel::A4));

        let no_rev = test_packet("4", None, history);
        let doc = document_with_catalog(vec![("Metadata", metadata_stream(&no_rev))]);
        assert_eq!(code_of(check(PdfALevel::A4, &doc)), Some(ErrorCode::MissingXmpProperty));

        let bad_rev = test_packet("4", None, &format!("<pdfaid:rev>20</pdfaid:rev>{}", history));
        let doc = document_with_catalog(vec![("Metadata", metadata_stream(&bad_rev))]);
        assert_eq!(code_of(check(PdfALevel::A4, &doc)), Some(ErrorCode::InvalidXmpProperty));

        let no_history = test_packet("4", None, "<pdfaid:rev>2020</pdfaid:rev>");
        let doc = document_with_catalog(vec![("Metadata", metadata_stream(&no_history))]);
        let err = check(PdfALevel::A4, &doc).unwrap_err();
        assert_eq!(err.as_conformance().map(|c| c.message()), Some("XMP metadata shall contain xmpMM:History".to_string()));
    }
}
